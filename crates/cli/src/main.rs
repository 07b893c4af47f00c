// SPDX-License-Identifier: MIT

//! `rtadpd`: the generic supervisor binary (SPEC_FULL.md §4.K).
//!
//! Two jobs, selected by environment rather than argv:
//!
//! - **Supervisor mode** (the normal case): `rtadpd <config_path>
//!   <process_name>` loads the named process record, binds its transport
//!   endpoints, starts its managers and workers, registers signal
//!   handlers, and blocks until a `shutdown`/`cleanedshutdown` command (or
//!   the matching signal) brings it to `Shutdown`.
//! - **Worker-subprocess mode**: when [`SubprocessArgs::from_env`] finds
//!   the marker a process-mode manager sets before re-exec'ing this same
//!   binary (see `rtadp_runtime::manager::ChildCommandBuilder`), `main`
//!   skips argument parsing entirely and runs the worker loop over
//!   stdin/stdout instead.
//!
//! This binary ships only [`IdentityHooks`] — pass-through decode/process
//! behavior, so the crate is runnable end-to-end before any
//! instrument-specific processor plugs in real domain logic by
//! implementing [`rtadp_runtime::Hooks`] itself.

mod exit_error;

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use clap::Parser;
use rtadp_core::{ConfigStore, ProcessConfig, SystemClock};
use rtadp_runtime::manager::ChildCommandBuilder;
use rtadp_runtime::worker::process::{self, SubprocessArgs};
use rtadp_runtime::{IdentityHooks, Supervisor, SupervisorEndpoints};
use rtadp_transport::{ResultSink, TransportError, ZmqTransport};
use tracing_subscriber::EnvFilter;

use exit_error::ExitError;

/// Version string embedded by `build.rs`: `<crate version>+<git hash>`.
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser, Debug)]
#[command(name = "rtadpd", version = VERSION, about = "Telescope data-acquisition pipeline supervisor")]
struct Cli {
    /// Path to the JSON process-configuration document (§4.A).
    config_path: PathBuf,
    /// `processname` of the record to run.
    process_name: String,
}

fn main() {
    init_tracing();

    if let Some(args) = SubprocessArgs::from_env() {
        run_worker_subprocess(args);
        return;
    }

    if let Err(e) = run() {
        tracing::error!(code = e.code, "{}", e.message);
        eprintln!("rtadpd: {}", e.message);
        std::process::exit(e.code);
    }
}

/// Logs go to stderr unconditionally: a process-mode worker subprocess
/// uses stdout as its framed result pipe back to the manager (§4.D), so
/// stdout must stay reserved for that traffic.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run_worker_subprocess(args: SubprocessArgs) {
    if let Err(e) = process::run_subprocess_loop(IdentityHooks, args) {
        tracing::error!(error = %e, "worker subprocess failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();

    let store = ConfigStore::load(&cli.config_path).map_err(|e| ExitError::new(1, format!("config error: {e}")))?;
    let config = store.validated(&cli.process_name).map_err(|e| ExitError::new(1, format!("config error: {e}")))?;

    let transport = ZmqTransport::new();
    let endpoints = build_endpoints(&transport, &config).map_err(|e| ExitError::new(2, format!("bind error: {e}")))?;

    let supervisor = Arc::new(
        Supervisor::new(config, endpoints, IdentityHooks, SystemClock)
            .map_err(|e| ExitError::new(2, format!("bind error: {e}")))?,
    );

    install_signal_handlers(supervisor.clone());

    let run_supervisor = supervisor.clone();
    let join = std::thread::spawn(move || run_supervisor.run(Some(child_command_builder())));

    join.join()
        .map_err(|_| ExitError::new(1, "supervisor panicked"))?
        .map_err(|e| ExitError::new(2, format!("bind error: {e}")))?;

    Ok(())
}

/// Opens the supervisor's ingress, command, monitoring, and per-manager
/// egress endpoints per the socket-flavor table in §4.F/§4.I.
fn build_endpoints(transport: &ZmqTransport, config: &ProcessConfig) -> Result<SupervisorEndpoints, TransportError> {
    let data_lp = Box::new(transport.open_data_source(config.datasocket_type, &config.data_lp_socket)?);
    let data_hp = Box::new(transport.open_data_source(config.datasocket_type, &config.data_hp_socket)?);
    let command = Box::new(transport.open_command_source(&config.command_socket)?);
    let monitoring = Box::new(transport.open_monitoring_sink(&config.monitoring_socket)?);

    let results = config
        .managers
        .iter()
        .map(|manager| {
            if manager.has_result_socket() {
                let sink = transport.open_result_sink(manager.result_socket_type, &manager.result_socket)?;
                Ok(Some(Box::new(sink) as Box<dyn ResultSink>))
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>, TransportError>>()?;

    Ok(SupervisorEndpoints { data_lp, data_hp, command, monitoring, results })
}

/// Builds the command a process-mode manager re-execs to launch a worker:
/// this same binary, with the arguments it was started with. The
/// subprocess's `main()` short-circuits on [`SubprocessArgs::from_env`]
/// before touching `config_path`/`process_name` again.
fn child_command_builder() -> ChildCommandBuilder {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("rtadpd"));
    let args: Vec<String> = std::env::args().skip(1).collect();
    Arc::new(move |_worker_id: usize| {
        let mut command = Command::new(&exe);
        command.args(&args);
        command
    })
}

/// Registers `SIGTERM`→`cleanedshutdown` and `SIGINT`→`shutdown` (§4.F,
/// §4.K) on a dedicated thread with its own single-threaded `tokio`
/// runtime, so the synchronous command loop in [`Supervisor::run`] doesn't
/// need to be made async just to observe signals.
fn install_signal_handlers<H, C>(supervisor: Arc<Supervisor<H, C>>)
where
    H: rtadp_runtime::Hooks,
    C: rtadp_core::Clock,
{
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_io().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "failed to start signal-handling runtime");
                return;
            }
        };
        runtime.block_on(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "failed to register SIGTERM handler");
                    return;
                }
            };
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "failed to register SIGINT handler");
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => supervisor.signal_cleaned_shutdown(),
                _ = sigint.recv() => supervisor.signal_shutdown(),
            }
        });
    });
}
