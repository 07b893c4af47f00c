// SPDX-License-Identifier: MIT

//! The periodic task (one per manager) that publishes monitoring snapshots
//! (§4.C).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtadp_core::Clock;
use rtadp_transport::MonitoringSink;
use tracing::warn;

use crate::monitoring_point::MonitoringPoint;

/// Default broadcast cadence: one snapshot per second. Tunable per the
/// component design's "implementation-defined; must be tunable".
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(1);

/// A pending directed-snapshot request, queued by the `getstatus` command
/// handler and served by the reporter's next tick.
pub struct DirectedRequest {
    pub pidsource: String,
}

/// Owns the stop signal and directed-request queue for one manager's
/// monitoring reporter. Cheap to clone and share with the command handler
/// that calls [`Self::request_directed`].
#[derive(Clone)]
pub struct MonitoringReporterHandle {
    stop: Arc<AtomicBool>,
    directed: flume::Sender<DirectedRequest>,
}

impl MonitoringReporterHandle {
    /// Queues a directed snapshot for `pidsource`, served on the
    /// reporter's next tick (not immediately — matches the source's
    /// `sendto` being a request rather than a synchronous call).
    pub fn request_directed(&self, pidsource: impl Into<String>) {
        let _ = self.directed.send(DirectedRequest { pidsource: pidsource.into() });
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Runs a manager's monitoring reporter loop: broadcasts a snapshot every
/// `cadence`, and in between serves any directed requests queued via the
/// returned [`MonitoringReporterHandle`]. Terminates promptly when the
/// manager calls [`MonitoringReporterHandle::stop`].
pub fn spawn<C, S>(point: Arc<MonitoringPoint<C>>, sink: S, cadence: Duration) -> (std::thread::JoinHandle<()>, MonitoringReporterHandle)
where
    C: Clock,
    S: MonitoringSink + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let (directed_tx, directed_rx) = flume::unbounded();
    let handle = MonitoringReporterHandle { stop: stop.clone(), directed: directed_tx };

    let join = std::thread::spawn(move || {
        let mut last_broadcast = std::time::Instant::now() - cadence;
        while !stop.load(Ordering::SeqCst) {
            // Serve any directed requests first so `getstatus` replies
            // promptly even between broadcast ticks.
            while let Ok(request) = directed_rx.try_recv() {
                let snapshot = point.snapshot_for(&request.pidsource);
                if let Err(e) = sink.send_string(&snapshot.to_json()) {
                    warn!(error = %e, pidsource = %request.pidsource, "directed monitoring send failed");
                }
            }

            if last_broadcast.elapsed() >= cadence {
                let snapshot = point.snapshot();
                if let Err(e) = sink.send_string(&snapshot.to_json()) {
                    warn!(error = %e, "broadcast monitoring send failed");
                }
                last_broadcast = std::time::Instant::now();
            }

            if stop.load(Ordering::SeqCst) {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    });

    (join, handle)
}

#[cfg(test)]
#[path = "monitoring_reporter_tests.rs"]
mod tests;
