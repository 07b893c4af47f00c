// SPDX-License-Identifier: MIT

//! The per-manager mutable snapshot object that is the source of truth for
//! every monitoring message (§4.B).

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use rtadp_core::{Clock, SupervisorState};
use rtadp_wire::{MonitoringHeader, MonitoringSnapshot, ProcInfo};
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::queue::{PriorityQueues, ResultQueue};
use crate::shared_region::{ControlFlags, MetricsRegion};

/// How long the two refreshes in [`MonitoringPoint::sample_cpu_percent`]
/// are spaced apart. `sysinfo` reports 0% cpu usage for any process whose
/// last two refreshes were closer together than this.
const CPU_PROBE_INTERVAL: Duration = Duration::from_millis(1_000);

/// A mutable struct bound to one manager: tracks the manager's own
/// lifecycle state and produces [`MonitoringSnapshot`]s on demand.
///
/// Sampling cpu% blocks for about a second (`sysinfo` needs two refreshes
/// spaced apart to compute a delta) — callers must only invoke
/// [`Self::snapshot`] from the dedicated monitoring-reporter task, never
/// from a worker or ingestion loop.
pub struct MonitoringPoint<C: Clock> {
    manager_fullname: String,
    clock: C,
    status: Mutex<SupervisorState>,
    extras: Mutex<BTreeMap<String, f64>>,
    queues: PriorityQueues,
    results: ResultQueue,
    control: ControlFlags,
    metrics: MetricsRegion,
    num_workers: usize,
    pid: Pid,
    probe_cpu: bool,
}

impl<C: Clock> MonitoringPoint<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        manager_fullname: impl Into<String>,
        clock: C,
        queues: PriorityQueues,
        results: ResultQueue,
        control: ControlFlags,
        metrics: MetricsRegion,
        num_workers: usize,
    ) -> Self {
        let pid = sysinfo::get_current_pid().unwrap_or(Pid::from(0));
        Self {
            manager_fullname: manager_fullname.into(),
            clock,
            status: Mutex::new(SupervisorState::Initialised),
            extras: Mutex::new(BTreeMap::new()),
            queues,
            results,
            control,
            metrics,
            num_workers,
            pid,
            probe_cpu: true,
        }
    }

    /// Skips the real ~1s cpu-usage probe, reporting 0% instead. For tests
    /// that exercise snapshot shape/content without paying the sampling
    /// interval.
    #[cfg(any(test, feature = "test-support"))]
    pub fn without_cpu_probe(mut self) -> Self {
        self.probe_cpu = false;
        self
    }

    /// Records an arbitrary named metric for a concrete processor's own
    /// use (not part of the fixed wire schema). Extension point, mirroring
    /// the source's generic `update(key, value)`.
    pub fn update(&self, key: impl Into<String>, value: f64) {
        self.extras.lock().unwrap_or_else(|e| e.into_inner()).insert(key.into(), value);
    }

    pub fn extras(&self) -> BTreeMap<String, f64> {
        self.extras.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_status(&self, state: SupervisorState) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn get_status(&self) -> SupervisorState {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Two cpu-usage refreshes spaced [`CPU_PROBE_INTERVAL`] apart, for the
    /// current process only. ~1s wall-clock; never call on a latency
    /// sensitive path (§9 design notes).
    fn sample_cpu_percent(&self) -> f64 {
        if !self.probe_cpu {
            return 0.0;
        }
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        std::thread::sleep(CPU_PROBE_INTERVAL);
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        system.process(self.pid).map(|p| p.cpu_usage() as f64).unwrap_or(0.0)
    }

    fn sample_memory_usage(&self) -> u64 {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        system.process(self.pid).map(|p| p.memory()).unwrap_or(0)
    }

    /// The source of truth for a broadcast monitoring message:
    /// `pidtarget = "*"`.
    pub fn snapshot(&self) -> MonitoringSnapshot {
        self.snapshot_for("*")
    }

    /// A directed snapshot addressed to `pidtarget`, for the `getstatus`
    /// command's `sendto` response.
    pub fn snapshot_for(&self, pidtarget: &str) -> MonitoringSnapshot {
        let mut header = MonitoringHeader::new(self.manager_fullname.clone(), self.clock.epoch_seconds());
        header.pidtarget = pidtarget.to_string();

        let per_worker = self.metrics.snapshot(self.num_workers);
        let mut worker_rates = BTreeMap::new();
        let mut worker_tot_events = BTreeMap::new();
        let mut worker_status = BTreeMap::new();
        for (id, (rate, total, status)) in per_worker.into_iter().enumerate() {
            worker_rates.insert(id as u32, rate);
            worker_tot_events.insert(id as u32, total as u64);
            worker_status.insert(id as u32, status);
        }

        MonitoringSnapshot {
            header,
            workermanagerstatus: self.get_status(),
            procinfo: ProcInfo { cpu_percent: self.sample_cpu_percent(), memory_usage: self.sample_memory_usage() },
            queue_lp_size: self.queues.lp_len() as u64,
            queue_hp_size: self.queues.hp_len() as u64,
            queue_result_size: self.results.len() as u64,
            stopdatainput: self.control.stopdata(),
            worker_rates,
            worker_tot_events,
            worker_status,
        }
    }
}

#[cfg(test)]
#[path = "monitoring_point_tests.rs"]
mod tests;
