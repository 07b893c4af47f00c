// SPDX-License-Identifier: MIT

//! Discrete lifecycle states for the supervisor and its managers.

use serde::{Deserialize, Serialize};

/// Operational phase of a [`Supervisor`](../rtadp_runtime/struct.Supervisor.html).
///
/// `Initialised` is the constructor result; `Shutdown` is terminal. Every
/// other transition is driven by a command (see the supervisor command
/// table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SupervisorState {
    Initialised,
    Waiting,
    Processing,
    EndingProcessing,
    Shutdown,
}

impl SupervisorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SupervisorState::Shutdown)
    }
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SupervisorState::Initialised => "Initialised",
            SupervisorState::Waiting => "Waiting",
            SupervisorState::Processing => "Processing",
            SupervisorState::EndingProcessing => "EndingProcessing",
            SupervisorState::Shutdown => "Shutdown",
        };
        f.write_str(s)
    }
}

/// Operational phase of a worker manager. Mirrors [`SupervisorState`] for
/// the manager's own lifecycle.
pub type ManagerState = SupervisorState;

/// Per-worker status, written by the worker itself and read by the
/// monitoring point. Represented as `i32` on the wire to match the
/// original int-enum encoding used by the monitoring snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum WorkerStatus {
    Idle = 0,
    Processing = 1,
    Stopped = 2,
}

impl WorkerStatus {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => WorkerStatus::Processing,
            2 => WorkerStatus::Stopped,
            _ => WorkerStatus::Idle,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
