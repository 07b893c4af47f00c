// SPDX-License-Identifier: MIT

//! Execution units that drain a manager's priority queues and invoke the
//! user's `process_data` hook (§4.D). Two flavors share one external
//! contract: [`thread`] runs in-process; [`process`] runs in a separate OS
//! process, communicating over framed pipes and a file-backed shared
//! memory region.

pub mod process;
pub mod thread;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handle to one running worker, regardless of flavor. `stop` signals
/// the worker to exit at its next suspension boundary (§5 cancellation);
/// `join` blocks until it has actually exited.
///
/// `fast` mirrors the manager's `stop(fast)` contract (§4.E): thread
/// workers ignore it (the manager alone decides whether to block on
/// `join`); process workers use it to kill the child outright instead of
/// waiting for the pipe-close/EOF handshake to unwind cleanly.
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    force_kill: Option<Arc<dyn Fn() + Send + Sync>>,
    join: Option<std::thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub(crate) fn new(stop: Arc<AtomicBool>, join: std::thread::JoinHandle<()>) -> Self {
        Self { stop, force_kill: None, join: Some(join) }
    }

    pub(crate) fn with_force_kill(
        stop: Arc<AtomicBool>,
        join: std::thread::JoinHandle<()>,
        force_kill: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self { stop, force_kill: Some(force_kill), join: Some(join) }
    }

    pub fn stop(&self, fast: bool) {
        self.stop.store(true, Ordering::SeqCst);
        if fast {
            if let Some(kill) = &self.force_kill {
                kill();
            }
        }
    }

    pub fn join(&mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.join();
    }
}
