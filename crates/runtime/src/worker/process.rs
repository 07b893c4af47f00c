// SPDX-License-Identifier: MIT

//! Process-mode worker: the manager's queues are bridged across the
//! process boundary over the child's stdin/stdout pipes (framed per
//! [`crate::frame`]), and rate/count/status are written through the
//! file-backed [`crate::shared_region::SharedRegion`] the manager created
//! for this process group.
//!
//! The parent side ([`spawn`]) owns priority selection: a feeder thread
//! drains the manager's queues in strict hp-then-lp order and writes each
//! selected payload down the child's stdin; a collector thread reads
//! result frames back off the child's stdout into the manager's result
//! queue. The child's own loop ([`run_subprocess_loop`]) only needs to
//! read a frame, call the user hook, and write the result back — the
//! pipes themselves are the cross-process FIFO the component design calls
//! for.

use std::io::{self, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rtadp_core::error::BindError;
use rtadp_core::{SystemClock, WorkerStatus};
use tracing::warn;

use crate::frame;
use crate::queue::{PriorityQueues, ResultQueue};
use crate::rate_window::RateWindow;
use crate::shared_region::{ControlFlags, MetricsRegion, SharedRegion};

use super::WorkerHandle;

const GATE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Environment variable a concrete processor's `main()` checks before
/// doing anything else; its presence means "run as a worker subprocess",
/// not "start the supervisor". See [`SubprocessArgs::from_env`].
pub const SUBPROCESS_ENV_VAR: &str = "RTADP_WORKER_SUBPROCESS";

/// Parameters threaded to a worker subprocess over environment variables
/// (argv is left free for the concrete processor's own arguments, e.g.
/// `<config_path> <process_name>`).
#[derive(Debug, Clone)]
pub struct SubprocessArgs {
    pub manager_name: String,
    pub worker_id: usize,
    pub region_path: std::path::PathBuf,
    pub window: Duration,
}

impl SubprocessArgs {
    fn into_env(self) -> Vec<(&'static str, String)> {
        vec![
            (SUBPROCESS_ENV_VAR, "1".to_string()),
            ("RTADP_WORKER_MANAGER_NAME", self.manager_name),
            ("RTADP_WORKER_ID", self.worker_id.to_string()),
            ("RTADP_WORKER_REGION_PATH", self.region_path.display().to_string()),
            ("RTADP_WORKER_WINDOW_SECS", self.window.as_secs().to_string()),
        ]
    }

    /// Reconstructs the parameters a child process was launched with. A
    /// concrete processor's `main()` calls this first; `None` means "run
    /// as the supervisor", not a worker subprocess.
    pub fn from_env() -> Option<Self> {
        if std::env::var(SUBPROCESS_ENV_VAR).ok().as_deref() != Some("1") {
            return None;
        }
        let manager_name = std::env::var("RTADP_WORKER_MANAGER_NAME").ok()?;
        let worker_id = std::env::var("RTADP_WORKER_ID").ok()?.parse().ok()?;
        let region_path = std::env::var("RTADP_WORKER_REGION_PATH").ok()?.into();
        let window_secs: u64 = std::env::var("RTADP_WORKER_WINDOW_SECS").ok()?.parse().ok()?;
        Some(Self { manager_name, worker_id, region_path, window: Duration::from_secs(window_secs) })
    }
}

/// Spawns a worker subprocess from `command` (typically the current
/// executable, re-invoked with the same arguments it was started with —
/// its `main()` must call [`SubprocessArgs::from_env`] and dispatch to
/// [`run_subprocess_loop`] when present) and wires up the feeder/collector
/// threads that bridge it to the manager's queues.
pub fn spawn(
    worker_id: usize,
    manager_name: impl Into<String>,
    mut command: Command,
    args: SubprocessArgs,
    queues: PriorityQueues,
    results: ResultQueue,
    control: ControlFlags,
) -> Result<WorkerHandle, BindError> {
    let manager_name = manager_name.into();
    command.envs(args.into_env());
    command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::inherit());

    let mut child = command
        .spawn()
        .map_err(|e| BindError::Bind { address: format!("worker-subprocess[{worker_id}]"), reason: e.to_string() })?;
    let mut child_stdin = child.stdin.take().ok_or_else(|| BindError::Bind {
        address: format!("worker-subprocess[{worker_id}]"),
        reason: "child stdin was not piped".to_string(),
    })?;
    let child_stdout = child.stdout.take().ok_or_else(|| BindError::Bind {
        address: format!("worker-subprocess[{worker_id}]"),
        reason: "child stdout was not piped".to_string(),
    })?;

    let child = Arc::new(Mutex::new(child));
    let child_for_kill = child.clone();

    let stop = Arc::new(AtomicBool::new(false));
    let feeder_stop = stop.clone();
    let feeder_manager_name = manager_name.clone();

    let feeder = std::thread::spawn(move || {
        while !feeder_stop.load(Ordering::SeqCst) {
            if !control.processdata() {
                std::thread::sleep(GATE_POLL_INTERVAL);
                continue;
            }
            if let Some((payload, priority)) = queues.try_recv_hp_then_lp() {
                if frame::write_frame(&mut child_stdin, &payload, priority).is_err() {
                    warn!(manager = %feeder_manager_name, worker_id, "worker subprocess pipe closed, stopping feeder");
                    break;
                }
            }
        }
        // Dropping stdin closes the child's read end, which is how its
        // `run_subprocess_loop` learns to stop.
        drop(child_stdin);
    });

    let collector = std::thread::spawn(move || {
        let mut reader = BufReader::new(child_stdout);
        loop {
            match frame::read_frame(&mut reader) {
                Ok(Some((payload, _priority))) => results.push(payload),
                Ok(None) => break,
                Err(e) => {
                    warn!(manager = %manager_name, worker_id, error = %e, "worker subprocess result stream error");
                    break;
                }
            }
        }
    });

    let join = std::thread::spawn(move || {
        let _ = feeder.join();
        let _ = collector.join();
        let _ = child.lock().unwrap_or_else(|e| e.into_inner()).wait();
    });

    let force_kill: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
        let _ = child_for_kill.lock().unwrap_or_else(|e| e.into_inner()).kill();
    });

    Ok(WorkerHandle::with_force_kill(stop, join, force_kill))
}

/// The child-process side of a process-mode worker: opens the shared
/// region the parent created, then reads frames off stdin until EOF
/// (the parent drops its stdin handle to signal stop), invoking `hooks`
/// for each and writing the result back on stdout.
pub fn run_subprocess_loop<H: crate::hooks::Hooks>(hooks: H, args: SubprocessArgs) -> io::Result<()> {
    let region = Arc::new(
        SharedRegion::open(&args.region_path)
            .map_err(|e| io::Error::other(e.to_string()))?,
    );
    let metrics = MetricsRegion::shared(region);

    let rate_window = Arc::new(Mutex::new(RateWindow::new(SystemClock, args.window)));
    let status = Arc::new(std::sync::atomic::AtomicI32::new(WorkerStatus::Idle.as_i32()));

    let ticker_stop = Arc::new(AtomicBool::new(false));
    let ticker_stop_for_thread = ticker_stop.clone();
    let ticker_window = rate_window.clone();
    let ticker_metrics = metrics.clone();
    let ticker_status = status.clone();
    let worker_id = args.worker_id;
    let ticker = std::thread::spawn(move || {
        while !ticker_stop_for_thread.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(250));
            if let Some((rate, total)) = ticker_window.lock().unwrap_or_else(|e| e.into_inner()).tick() {
                let status = WorkerStatus::from_i32(ticker_status.load(Ordering::SeqCst));
                ticker_metrics.publish(worker_id, rate, total, status);
            }
        }
    });

    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    metrics.set_status(args.worker_id, WorkerStatus::Idle);
    loop {
        match frame::read_frame(&mut stdin_lock) {
            Ok(Some((payload, priority))) => {
                status.store(WorkerStatus::Processing.as_i32(), Ordering::SeqCst);
                metrics.set_status(args.worker_id, WorkerStatus::Processing);
                match hooks.process_data(payload, priority) {
                    Ok(result) => {
                        if frame::write_frame(&mut stdout_lock, &result, priority).is_err() {
                            break;
                        }
                        let _ = stdout_lock.flush();
                    }
                    Err(e) => warn!(worker_id = args.worker_id, reason = %e, "process_data failed, dropping payload"),
                }
                rate_window.lock().unwrap_or_else(|e| e.into_inner()).record_processed();
                status.store(WorkerStatus::Idle.as_i32(), Ordering::SeqCst);
                metrics.set_status(args.worker_id, WorkerStatus::Idle);
            }
            Ok(None) => break,
            Err(_) => break,
        }
    }

    ticker_stop.store(true, Ordering::SeqCst);
    let _ = ticker.join();
    metrics.set_status(args.worker_id, WorkerStatus::Stopped);
    Ok(())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
