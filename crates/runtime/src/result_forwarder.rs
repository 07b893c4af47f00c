// SPDX-License-Identifier: MIT

//! The supervisor's result forwarder (§4.G): one task that sweeps every
//! manager's result queue each cycle and publishes whatever it finds on
//! that manager's configured egress socket.
//!
//! §9 open question: the source re-dequeues the result queue a second time
//! when forwarding `binary` results, discarding the item it already popped.
//! This forwards the exact payload `try_pop` returned — no second dequeue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtadp_core::{Clock, DataflowType};
use rtadp_transport::ResultSink;
use tracing::warn;

use crate::hooks::Hooks;
use crate::manager::WorkerManager;

/// Sleep between full sweeps of every manager (§9 "short sleep between polls").
const SWEEP_INTERVAL: Duration = Duration::from_millis(1);

pub struct ResultForwarderHandle {
    stop: Arc<AtomicBool>,
    join: Option<std::thread::JoinHandle<()>>,
}

impl ResultForwarderHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn join(&mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ResultForwarderHandle {
    fn drop(&mut self) {
        self.join();
    }
}

/// One entry per manager: the manager itself plus its (possibly absent)
/// egress sink, aligned by position (`manager_result_socket[i]`).
pub struct ForwarderTarget<H: Hooks, C: Clock> {
    pub manager: Arc<WorkerManager<H, C>>,
    pub sink: Option<Box<dyn ResultSink>>,
}

pub fn spawn<H, C>(targets: Vec<ForwarderTarget<H, C>>) -> ResultForwarderHandle
where
    H: Hooks,
    C: Clock,
{
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();

    let join = std::thread::spawn(move || {
        let mut targets = targets;
        while !thread_stop.load(Ordering::SeqCst) {
            for target in targets.iter_mut() {
                let Some(sink) = target.sink.as_ref() else { continue };
                if let Some(payload) = target.manager.results().try_pop() {
                    let result = match target.manager.config().result_dataflow_type {
                        DataflowType::Binary => sink.send_bytes(&payload.into_bytes()),
                        DataflowType::String | DataflowType::Filename => sink.send_string(&payload.into_string_lossy()),
                    };
                    if let Err(e) = result {
                        warn!(manager = %target.manager.name, error = %e, "result forward failed, dropping item");
                    }
                }
            }
            std::thread::sleep(SWEEP_INTERVAL);
        }
    });

    ResultForwarderHandle { stop, join: Some(join) }
}

#[cfg(test)]
#[path = "result_forwarder_tests.rs"]
mod tests;
