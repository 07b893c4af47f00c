// SPDX-License-Identifier: MIT

//! The periodic monitoring snapshot published on a manager's monitoring
//! socket.

use std::collections::BTreeMap;

use rtadp_core::SupervisorState;
use serde::{Deserialize, Serialize};

/// The `header` object of a monitoring snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringHeader {
    /// Fixed discriminant for this message family, carried as `1` on the
    /// wire for compatibility with the original int-tagged header.
    #[serde(rename = "type")]
    pub kind: u32,
    pub time: f64,
    pub pidsource: String,
    pub pidtarget: String,
}

impl MonitoringHeader {
    pub fn new(pidsource: impl Into<String>, time: f64) -> Self {
        Self { kind: 1, time, pidsource: pidsource.into(), pidtarget: "*".to_string() }
    }
}

/// Host-process resource usage, sampled once per snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcInfo {
    pub cpu_percent: f64,
    pub memory_usage: u64,
}

/// One manager's full monitoring snapshot: lifecycle state, queue depths,
/// host resource usage, and per-worker rate/count/status, keyed by worker
/// id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    pub header: MonitoringHeader,
    pub workermanagerstatus: SupervisorState,
    pub procinfo: ProcInfo,
    pub queue_lp_size: u64,
    pub queue_hp_size: u64,
    pub queue_result_size: u64,
    pub stopdatainput: bool,
    pub worker_rates: BTreeMap<u32, f64>,
    pub worker_tot_events: BTreeMap<u32, u64>,
    pub worker_status: BTreeMap<u32, i32>,
}

impl MonitoringSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "monitoring_tests.rs"]
mod tests;
