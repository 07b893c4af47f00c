// SPDX-License-Identifier: MIT

//! The supervisor (§4.F): owns the transport endpoints, the control-plane
//! state machine, the lp/hp ingestion tasks, and one-or-more managers. The
//! command listener (§4.H) is implemented here as the supervisor's own
//! blocking command loop rather than a separate component, matching "part
//! of the supervisor" in the component design.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rtadp_core::config::ManagerConfig;
use rtadp_core::error::BindError;
use rtadp_core::{Clock, DataflowType, ProcessConfig, ProcessingType, Priority, SupervisorState};
use rtadp_transport::{CommandSource, DataSource, MonitoringSink, ResultSink, TransportError};
use rtadp_wire::{CommandMessage, Subtype};
use tracing::{info, warn};

use crate::hooks::Hooks;
use crate::ingestion;
use crate::manager::{ChildCommandBuilder, WorkerManager};
use crate::monitoring_reporter::DEFAULT_CADENCE;
use crate::result_forwarder::{self, ForwarderTarget, ResultForwarderHandle};

/// How often the command loop polls its non-blocking command source.
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How often `cleanedshutdown` re-checks whether every queue has drained
/// (§5 "polls queue sizes every 100 ms", no hard deadline).
const CLEANEDSHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The transport endpoints a concrete binary wires up (real ZeroMQ sockets,
/// or [`rtadp_transport::fake`] doubles in tests) before handing them to
/// [`Supervisor::new`]. `results[i]` is the egress sink for `config.managers[i]`,
/// `None` when that manager's `result_socket` is the `"none"` sentinel.
pub struct SupervisorEndpoints {
    pub data_lp: Box<dyn DataSource>,
    pub data_hp: Box<dyn DataSource>,
    pub command: Box<dyn CommandSource>,
    pub monitoring: Box<dyn MonitoringSink>,
    pub results: Vec<Option<Box<dyn ResultSink>>>,
}

/// A fan-out handle onto the supervisor's single monitoring socket: every
/// manager's reporter gets its own clone, and a dedicated publisher thread
/// serializes all sends on the one real socket it owns exclusively (§4.I
/// "single-owner discipline").
#[derive(Clone)]
struct MonitoringFanout {
    tx: flume::Sender<String>,
}

impl MonitoringSink for MonitoringFanout {
    fn send_string(&self, payload: &str) -> Result<(), TransportError> {
        self.tx.send(payload.to_string()).map_err(|e| TransportError::Send(e.to_string()))
    }
}

fn spawn_monitoring_publisher(
    sink: Box<dyn MonitoringSink>,
    rx: flume::Receiver<String>,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(payload) => {
                    if let Err(e) = sink.send_string(&payload) {
                        warn!(error = %e, "monitoring publish failed");
                    }
                }
                Err(flume::RecvTimeoutError::Timeout) => continue,
                Err(flume::RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

pub struct Supervisor<H: Hooks, C: Clock> {
    pub name: String,
    hooks: H,
    dataflow_type: DataflowType,
    managers: Vec<Arc<WorkerManager<H, C>>>,
    data_lp: Mutex<Option<Box<dyn DataSource>>>,
    data_hp: Mutex<Option<Box<dyn DataSource>>>,
    command: Mutex<Option<Box<dyn CommandSource>>>,
    monitoring_sink: Mutex<Option<Box<dyn MonitoringSink>>>,
    monitoring_tx: flume::Sender<String>,
    monitoring_rx: Mutex<Option<flume::Receiver<String>>>,
    result_sinks: Mutex<Option<Vec<Option<Box<dyn ResultSink>>>>>,
    state: Mutex<SupervisorState>,
    stopdata: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handles: Mutex<Vec<std::thread::JoinHandle<()>>>,
    result_forwarder: Mutex<Option<ResultForwarderHandle>>,
}

impl<H: Hooks, C: Clock> Supervisor<H, C> {
    pub fn new(config: ProcessConfig, endpoints: SupervisorEndpoints, hooks: H, clock: C) -> Result<Self, BindError> {
        let name = config.processname.clone();
        let managers = config
            .managers
            .iter()
            .cloned()
            .map(|manager_config: ManagerConfig| {
                let manager_name = format!("{name}/manager-{}", manager_config.index);
                WorkerManager::new(manager_name, manager_config, config.processing_type, hooks.clone(), clock.clone()).map(Arc::new)
            })
            .collect::<Result<Vec<_>, BindError>>()?;

        let (monitoring_tx, monitoring_rx) = flume::unbounded();

        Ok(Self {
            name,
            hooks,
            dataflow_type: config.dataflow_type,
            managers,
            data_lp: Mutex::new(Some(endpoints.data_lp)),
            data_hp: Mutex::new(Some(endpoints.data_hp)),
            command: Mutex::new(Some(endpoints.command)),
            monitoring_sink: Mutex::new(Some(endpoints.monitoring)),
            monitoring_tx,
            monitoring_rx: Mutex::new(Some(monitoring_rx)),
            result_sinks: Mutex::new(Some(endpoints.results)),
            state: Mutex::new(SupervisorState::Initialised),
            stopdata: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(true)),
            handles: Mutex::new(Vec::new()),
            result_forwarder: Mutex::new(None),
        })
    }

    pub fn managers(&self) -> &[Arc<WorkerManager<H, C>>] {
        &self.managers
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SupervisorState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        info!(supervisor = %self.name, ?state, "supervisor state transition");
    }

    pub fn stopdata(&self) -> bool {
        self.stopdata.load(Ordering::SeqCst)
    }

    /// §4.E/§4.F lifecycle step 1: spawn every manager's monitoring
    /// reporter, and (on first call) the shared monitoring publisher
    /// thread that owns the real socket.
    pub fn start_managers(&self) -> Result<(), BindError> {
        if let Some(sink) = self.monitoring_sink.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let rx = self
                .monitoring_rx
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take()
                .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "monitoring channel already consumed".into() })?;
            let handle = spawn_monitoring_publisher(sink, rx, self.running.clone());
            self.handles.lock().unwrap_or_else(|e| e.into_inner()).push(handle);
        }
        for manager in &self.managers {
            manager.start(MonitoringFanout { tx: self.monitoring_tx.clone() }, DEFAULT_CADENCE);
        }
        Ok(())
    }

    /// §4.E/§4.F lifecycle step 2: spawn every manager's worker pool.
    pub fn start_workers(&self, child_command: Option<ChildCommandBuilder>) -> Result<(), BindError> {
        for manager in &self.managers {
            manager.start_workers(child_command.clone())?;
        }
        Ok(())
    }

    fn take_data_lp(&self) -> Result<Box<dyn DataSource>, BindError> {
        self.data_lp
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "lp data source already consumed".into() })
    }

    fn take_data_hp(&self) -> Result<Box<dyn DataSource>, BindError> {
        self.data_hp
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "hp data source already consumed".into() })
    }

    fn take_command(&self) -> Result<Box<dyn CommandSource>, BindError> {
        self.command
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "command source already consumed".into() })
    }

    fn build_forwarder_targets(&self) -> Result<Vec<ForwarderTarget<H, C>>, BindError> {
        let mut sinks = self
            .result_sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| BindError::Bind { address: self.name.clone(), reason: "result sinks already consumed".into() })?;

        Ok(self
            .managers
            .iter()
            .enumerate()
            .map(|(i, manager)| ForwarderTarget { manager: manager.clone(), sink: sinks.get_mut(i).and_then(Option::take) })
            .collect())
    }

    /// Runs the supervisor to completion: starts managers and workers,
    /// spawns the ingestion and result-forwarder tasks, then blocks the
    /// calling thread on the command loop until a `shutdown` or
    /// `cleanedshutdown` command brings the supervisor to `Shutdown`.
    pub fn run(&self, child_command: Option<ChildCommandBuilder>) -> Result<(), BindError> {
        self.start_managers()?;
        self.start_workers(child_command)?;
        self.set_state(SupervisorState::Waiting);

        let data_lp = self.take_data_lp()?;
        let data_hp = self.take_data_hp()?;
        let command = self.take_command()?;

        let lp_handle = ingestion::spawn(
            "lp",
            Priority::Low,
            data_lp,
            self.managers.clone(),
            self.hooks.clone(),
            self.dataflow_type,
            self.stopdata.clone(),
            self.running.clone(),
        );
        let hp_handle = ingestion::spawn(
            "hp",
            Priority::High,
            data_hp,
            self.managers.clone(),
            self.hooks.clone(),
            self.dataflow_type,
            self.stopdata.clone(),
            self.running.clone(),
        );
        self.handles.lock().unwrap_or_else(|e| e.into_inner()).extend([lp_handle, hp_handle]);

        let targets = self.build_forwarder_targets()?;
        let forwarder = result_forwarder::spawn(targets);
        *self.result_forwarder.lock().unwrap_or_else(|e| e.into_inner()) = Some(forwarder);

        self.command_loop(command);
        Ok(())
    }

    /// Invoked by the CLI's `SIGTERM` handler: same effect as a
    /// `cleanedshutdown` command, without going through the wire (§4.K).
    pub fn signal_cleaned_shutdown(&self) {
        info!(supervisor = %self.name, "SIGTERM received, starting cleaned shutdown");
        self.cmd_cleaned_shutdown();
    }

    /// Invoked by the CLI's `SIGINT` handler: same effect as a `shutdown`
    /// command, without going through the wire (§4.K).
    pub fn signal_shutdown(&self) {
        info!(supervisor = %self.name, "SIGINT received, starting forced shutdown");
        self.cmd_shutdown();
    }

    fn command_loop(&self, command: Box<dyn CommandSource>) {
        loop {
            match command.try_recv_string() {
                Ok(Some(raw)) => self.handle_command(&raw),
                Ok(None) => {}
                Err(e) => warn!(supervisor = %self.name, error = %e, "command receive failed"),
            }
            if self.state() == SupervisorState::Shutdown {
                break;
            }
            std::thread::sleep(COMMAND_POLL_INTERVAL);
        }
    }

    fn handle_command(&self, raw: &str) {
        let message = match CommandMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(supervisor = %self.name, error = %e, "invalid command, ignoring");
                return;
            }
        };

        info!(
            supervisor = %self.name,
            subtype = ?message.header.subtype,
            pidsource = %message.header.pidsource,
            "command received"
        );

        if !message.targets(&self.name) {
            return;
        }

        match message.header.subtype {
            Subtype::Start => self.cmd_start(),
            Subtype::Stop => self.cmd_stop(),
            Subtype::Stopdata => self.stopdata.store(true, Ordering::SeqCst),
            Subtype::Startdata => self.stopdata.store(false, Ordering::SeqCst),
            Subtype::Reset => self.cmd_reset(),
            Subtype::Getstatus => self.cmd_getstatus(&message.header.pidsource),
            Subtype::Shutdown => self.cmd_shutdown(),
            Subtype::Cleanedshutdown => self.cmd_cleaned_shutdown(),
        }
    }

    fn cmd_start(&self) {
        self.set_state(SupervisorState::Processing);
        for manager in &self.managers {
            manager.set_state(SupervisorState::Processing);
            manager.set_processdata(true);
        }
    }

    fn cmd_stop(&self) {
        self.set_state(SupervisorState::Waiting);
        for manager in &self.managers {
            manager.set_processdata(false);
            manager.set_state(SupervisorState::Waiting);
        }
    }

    fn cmd_reset(&self) {
        if !matches!(self.state(), SupervisorState::Processing | SupervisorState::Waiting) {
            warn!(supervisor = %self.name, state = ?self.state(), "reset ignored: precondition not met");
            return;
        }
        self.stopdata.store(true, Ordering::SeqCst);
        for manager in &self.managers {
            manager.set_processdata(false);
            manager.clean_queue();
            manager.set_state(SupervisorState::Waiting);
        }
        self.stopdata.store(false, Ordering::SeqCst);
        self.set_state(SupervisorState::Waiting);
    }

    fn cmd_getstatus(&self, pidsource: &str) {
        for manager in &self.managers {
            manager.request_directed_snapshot(pidsource);
        }
    }

    fn cmd_shutdown(&self) {
        self.stopdata.store(true, Ordering::SeqCst);
        self.stop_all(true);
        self.set_state(SupervisorState::Shutdown);
    }

    /// §9 open question resolved: both the lp *and* hp queues (plus the
    /// result queue) must drain before a cleaned shutdown proceeds — not
    /// the lp queue checked twice.
    fn cmd_cleaned_shutdown(&self) {
        if self.state() != SupervisorState::Processing {
            warn!(supervisor = %self.name, state = ?self.state(), "cleanedshutdown outside Processing, falling back to forced shutdown");
            self.cmd_shutdown();
            return;
        }

        self.stopdata.store(true, Ordering::SeqCst);
        for manager in &self.managers {
            manager.set_state(SupervisorState::EndingProcessing);
        }

        while !self.managers.iter().all(|m| m.queues().is_empty() && m.results().is_empty()) {
            std::thread::sleep(CLEANEDSHUTDOWN_POLL_INTERVAL);
        }

        self.stop_all(false);
        self.set_state(SupervisorState::Shutdown);
    }

    fn stop_all(&self, fast: bool) {
        self.running.store(false, Ordering::SeqCst);
        for manager in &self.managers {
            manager.stop(fast);
        }
        if let Some(mut forwarder) = self.result_forwarder.lock().unwrap_or_else(|e| e.into_inner()).take() {
            forwarder.stop();
            forwarder.join();
        }
        for handle in self.handles.lock().unwrap_or_else(|e| e.into_inner()).drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
