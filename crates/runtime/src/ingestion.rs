// SPDX-License-Identifier: MIT

//! The supervisor's lp/hp ingestion tasks (§4.F): read one data source,
//! decode per the process's `dataflow_type`, and enqueue the result on
//! every manager's corresponding priority queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtadp_core::{Clock, DataflowType, Payload, Priority};
use rtadp_transport::DataSource;
use tracing::warn;

use crate::hooks::Hooks;
use crate::manager::WorkerManager;

/// How long an ingestion task sleeps after a non-blocking receive finds
/// nothing waiting, before polling again (§5 "ingress tasks suspend on
/// socket receive").
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[allow(clippy::too_many_arguments)]
pub fn spawn<H, C>(
    label: &'static str,
    priority: Priority,
    source: Box<dyn DataSource>,
    managers: Vec<Arc<WorkerManager<H, C>>>,
    hooks: H,
    dataflow_type: DataflowType,
    stopdata: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()>
where
    H: Hooks,
    C: Clock,
{
    std::thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            let items = match dataflow_type {
                DataflowType::Binary => match source.try_recv_bytes() {
                    Ok(Some(bytes)) => decode_binary(&hooks, bytes),
                    Ok(None) => {
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                    Err(e) => {
                        warn!(task = label, error = %e, "ingestion receive failed");
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                },
                DataflowType::String => match source.try_recv_string() {
                    Ok(Some(text)) => vec![Payload::Text(text)],
                    Ok(None) => {
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                    Err(e) => {
                        warn!(task = label, error = %e, "ingestion receive failed");
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                },
                DataflowType::Filename => match source.try_recv_string() {
                    Ok(Some(name)) => open_file(&hooks, &name),
                    Ok(None) => {
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                    Err(e) => {
                        warn!(task = label, error = %e, "ingestion receive failed");
                        std::thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                },
            };

            if stopdata.load(Ordering::SeqCst) {
                continue;
            }
            for item in items {
                for manager in &managers {
                    match priority {
                        Priority::High => manager.queues().push_hp(item.clone()),
                        Priority::Low => manager.queues().push_lp(item.clone()),
                    }
                }
            }
        }
    })
}

fn decode_binary<H: Hooks>(hooks: &H, bytes: Vec<u8>) -> Vec<Payload> {
    match hooks.decode_data(bytes) {
        Ok(payload) => vec![payload],
        Err(e) => {
            warn!(reason = %e, "decode_data failed, dropping frame");
            Vec::new()
        }
    }
}

fn open_file<H: Hooks>(hooks: &H, name: &str) -> Vec<Payload> {
    match hooks.open_file(name) {
        Ok(items) => items,
        Err(e) => {
            warn!(reason = %e, filename = name, "open_file failed, dropping frame");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "ingestion_tests.rs"]
mod tests;
