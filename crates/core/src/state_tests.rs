// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn only_shutdown_is_terminal() {
    assert!(SupervisorState::Shutdown.is_terminal());
    assert!(!SupervisorState::Initialised.is_terminal());
    assert!(!SupervisorState::Waiting.is_terminal());
    assert!(!SupervisorState::Processing.is_terminal());
    assert!(!SupervisorState::EndingProcessing.is_terminal());
}

#[test]
fn worker_status_round_trips_through_i32() {
    for status in [WorkerStatus::Idle, WorkerStatus::Processing, WorkerStatus::Stopped] {
        assert_eq!(WorkerStatus::from_i32(status.as_i32()), status);
    }
}

#[test]
fn worker_status_defaults_unknown_values_to_idle() {
    assert_eq!(WorkerStatus::from_i32(99), WorkerStatus::Idle);
    assert_eq!(WorkerStatus::from_i32(-1), WorkerStatus::Idle);
}

#[test]
fn state_display_matches_serde_rename() {
    assert_eq!(SupervisorState::EndingProcessing.to_string(), "EndingProcessing");
}
