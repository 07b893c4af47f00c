// SPDX-License-Identifier: MIT

//! In-process worker: runs as an OS thread, reads the manager's queues
//! directly, and writes its own metrics slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtadp_core::{Clock, WorkerStatus};
use tracing::warn;

use crate::hooks::Hooks;
use crate::queue::{PriorityQueues, ResultQueue};
use crate::rate_window::RateWindow;
use crate::shared_region::{ControlFlags, MetricsRegion};

use super::WorkerHandle;

/// How long a gated (processdata=0) worker sleeps before re-checking the
/// flag (§4.D core loop step 1, "sleep briefly and continue").
const GATE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[allow(clippy::too_many_arguments)]
pub fn spawn<H, C>(
    worker_id: usize,
    manager_name: impl Into<String>,
    hooks: H,
    queues: PriorityQueues,
    results: ResultQueue,
    control: ControlFlags,
    metrics: MetricsRegion,
    clock: C,
    window: Duration,
) -> WorkerHandle
where
    H: Hooks,
    C: Clock,
{
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();
    let manager_name = manager_name.into();

    let join = std::thread::spawn(move || {
        let mut rate_window = RateWindow::new(clock, window);
        let mut status = WorkerStatus::Idle;
        metrics.set_status(worker_id, status);

        while !thread_stop.load(Ordering::SeqCst) {
            if !control.processdata() {
                if status != WorkerStatus::Idle {
                    status = WorkerStatus::Idle;
                    metrics.set_status(worker_id, status);
                }
                std::thread::sleep(GATE_POLL_INTERVAL);
            } else if let Some((payload, priority)) = queues.try_recv_hp_then_lp() {
                status = WorkerStatus::Processing;
                metrics.set_status(worker_id, status);
                match hooks.process_data(payload, priority) {
                    Ok(result) => results.push(result),
                    Err(e) => warn!(manager = %manager_name, worker_id, reason = %e, "process_data failed, dropping payload"),
                }
                rate_window.record_processed();
            }

            if let Some((rate, total)) = rate_window.tick() {
                metrics.publish(worker_id, rate, total, status);
            }

            if thread_stop.load(Ordering::SeqCst) {
                break;
            }
        }

        metrics.set_status(worker_id, WorkerStatus::Stopped);
    });

    WorkerHandle::new(stop, join)
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;
