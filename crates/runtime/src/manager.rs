// SPDX-License-Identifier: MIT

//! Owns one logical processing stage: its two ingress queues, its result
//! queue, its monitoring point/reporter, and its worker pool (§4.E).

use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rtadp_core::config::ManagerConfig;
use rtadp_core::error::BindError;
use rtadp_core::{Clock, ManagerState, ProcessingType};
use rtadp_transport::MonitoringSink;
use tracing::info;

use crate::hooks::Hooks;
use crate::monitoring_point::MonitoringPoint;
use crate::monitoring_reporter::{self, MonitoringReporterHandle};
use crate::queue::{PriorityQueues, ResultQueue};
use crate::rate_window::DEFAULT_WINDOW;
use crate::shared_region::{ControlFlags, MetricsRegion, SharedRegion};
use crate::worker::{process, thread, WorkerHandle};

/// Builds the `Command` used to launch worker `worker_id` as an OS
/// process — typically the current executable re-invoked with the same
/// arguments it started with, so its `main()` sees
/// [`process::SubprocessArgs::from_env`] and runs the worker loop instead
/// of the full supervisor.
pub type ChildCommandBuilder = Arc<dyn Fn(usize) -> Command + Send + Sync>;

/// One worker manager: owns the state for a single configured stage
/// (`manager_result_socket[i]` and friends in the process config).
pub struct WorkerManager<H: Hooks, C: Clock> {
    pub name: String,
    clock: C,
    hooks: H,
    config: ManagerConfig,
    processing_type: ProcessingType,
    state: Mutex<ManagerState>,
    queues: PriorityQueues,
    results: ResultQueue,
    control: ControlFlags,
    metrics: MetricsRegion,
    shared_region: Option<Arc<SharedRegion>>,
    workers: Mutex<Vec<WorkerHandle>>,
    monitoring_point: Arc<MonitoringPoint<C>>,
    reporter: Mutex<Option<(std::thread::JoinHandle<()>, MonitoringReporterHandle)>>,
}

impl<H: Hooks, C: Clock> WorkerManager<H, C> {
    /// Constructs a manager for `config`, named `name` (the supervisor's
    /// `<processname>/manager-<index>` convention). Does not start
    /// workers or the monitoring reporter yet — see [`Self::start`] and
    /// [`Self::start_workers`], invoked once the supervisor enters
    /// `Waiting`.
    pub fn new(
        name: impl Into<String>,
        config: ManagerConfig,
        processing_type: ProcessingType,
        hooks: H,
        clock: C,
    ) -> Result<Self, BindError> {
        let name = name.into();
        let num_workers = config.num_workers as usize;
        let queues = PriorityQueues::new();
        let results = ResultQueue::new();

        let (control, metrics, shared_region) = match processing_type {
            ProcessingType::Thread => (ControlFlags::local(), MetricsRegion::local(num_workers), None),
            ProcessingType::Process => {
                let path = shared_region_path(&name);
                let region = Arc::new(SharedRegion::create(&path, num_workers)?);
                (ControlFlags::shared(region.clone()), MetricsRegion::shared(region.clone()), Some(region))
            }
        };

        let monitoring_point = Arc::new(MonitoringPoint::new(
            name.clone(),
            clock.clone(),
            queues.clone(),
            results.clone(),
            control.clone(),
            metrics.clone(),
            num_workers,
        ));

        Ok(Self {
            name,
            clock,
            hooks,
            config,
            processing_type,
            state: Mutex::new(ManagerState::Initialised),
            queues,
            results,
            control,
            metrics,
            shared_region,
            workers: Mutex::new(Vec::new()),
            monitoring_point,
            reporter: Mutex::new(None),
        })
    }

    pub fn queues(&self) -> &PriorityQueues {
        &self.queues
    }

    pub fn results(&self) -> &ResultQueue {
        &self.results
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn state(&self) -> ManagerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_state(&self, state: ManagerState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        self.monitoring_point.set_status(state);
        info!(manager = %self.name, ?state, "manager state transition");
    }

    pub fn monitoring_point(&self) -> Arc<MonitoringPoint<C>> {
        self.monitoring_point.clone()
    }

    /// Spawns this manager's monitoring reporter. Called once, before
    /// [`Self::start_workers`] (§3 lifecycle ordering).
    pub fn start(&self, sink: impl MonitoringSink + 'static, cadence: Duration) {
        let (join, handle) = monitoring_reporter::spawn(self.monitoring_point.clone(), sink, cadence);
        *self.reporter.lock().unwrap_or_else(|e| e.into_inner()) = Some((join, handle));
    }

    pub fn request_directed_snapshot(&self, pidsource: &str) {
        if let Some((_, handle)) = self.reporter.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            handle.request_directed(pidsource);
        }
    }

    /// Spawns the configured number of workers, of the configured flavor.
    /// `child_command` is only consulted in process mode.
    pub fn start_workers(&self, child_command: Option<ChildCommandBuilder>) -> Result<(), BindError> {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        for worker_id in 0..(self.config.num_workers as usize) {
            let handle = match self.processing_type {
                ProcessingType::Thread => thread::spawn(
                    worker_id,
                    self.name.clone(),
                    self.hooks.clone(),
                    self.queues.clone(),
                    self.results.clone(),
                    self.control.clone(),
                    self.metrics.clone(),
                    self.clock.clone(),
                    DEFAULT_WINDOW,
                ),
                ProcessingType::Process => {
                    let region = self
                        .shared_region
                        .as_ref()
                        .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "no shared region for process-mode manager".into() })?;
                    let builder = child_command.clone().ok_or_else(|| BindError::Bind {
                        address: self.name.clone(),
                        reason: "process-mode manager requires a child command builder".into(),
                    })?;
                    let args = process::SubprocessArgs {
                        manager_name: self.name.clone(),
                        worker_id,
                        region_path: region.path().to_path_buf(),
                        window: DEFAULT_WINDOW,
                    };
                    process::spawn(
                        worker_id,
                        self.name.clone(),
                        builder(worker_id),
                        args,
                        self.queues.clone(),
                        self.results.clone(),
                        self.control.clone(),
                    )?
                }
            };
            workers.push(handle);
        }
        info!(manager = %self.name, count = self.config.num_workers, "workers started");
        Ok(())
    }

    /// §4.E `set_processdata`: gates whether this manager's workers
    /// consume. Crosses the process boundary for free — `processdata` is
    /// always backed by [`ControlFlags`], shared in process mode.
    pub fn set_processdata(&self, enabled: bool) {
        self.control.set_processdata(enabled);
    }

    pub fn processdata(&self) -> bool {
        self.control.processdata()
    }

    /// §4.E `clean_queue`: empties both ingress queues and the result
    /// queue. Callers must ensure the manager is `Waiting` or already
    /// stopped.
    pub fn clean_queue(&self) {
        self.queues.drain();
        self.results.drain();
    }

    /// §4.E `stop(fast)`: sets the stop-event for all workers and stops
    /// the monitoring reporter. In process mode with `fast=false`, the
    /// worker handles' own stop already drains/closes the pipes and joins
    /// the feeder/collector threads (§9 "dual queue close"); `fast=true`
    /// kills the child outright instead.
    pub fn stop(&self, fast: bool) {
        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        for worker in workers.iter() {
            worker.stop(fast);
        }
        if !fast || self.processing_type == ProcessingType::Thread {
            for worker in workers.iter_mut() {
                worker.join();
            }
        }
        workers.clear();

        if let Some((join, handle)) = self.reporter.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.stop();
            let _ = join.join();
        }
    }
}

fn shared_region_path(manager_name: &str) -> PathBuf {
    let sanitized: String = manager_name.chars().map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' }).collect();
    std::env::temp_dir().join(format!("rtadp-{sanitized}-{}.region", std::process::id()))
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
