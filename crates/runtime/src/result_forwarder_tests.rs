// SPDX-License-Identifier: MIT

use super::*;
use rtadp_core::config::ManagerConfig;
use rtadp_core::error::ProcessingError;
use rtadp_core::{FakeClock, Payload, Priority, ProcessingType, SocketType};
use rtadp_transport::fake::FakeResultSink;
use std::time::Instant;

#[derive(Clone, Copy, Default)]
struct EchoHooks;

impl Hooks for EchoHooks {
    fn process_data(&self, payload: Payload, _priority: Priority) -> Result<Payload, ProcessingError> {
        Ok(payload)
    }
}

fn config(index: usize, result_dataflow_type: DataflowType) -> ManagerConfig {
    ManagerConfig { index, result_socket: "tcp://localhost:6000".to_string(), result_socket_type: SocketType::Pushpull, result_dataflow_type, num_workers: 0 }
}

fn wait_until(deadline_secs: u64, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(deadline_secs);
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn forwards_a_binary_result_exactly_once_without_a_second_dequeue() {
    let manager = Arc::new(WorkerManager::new("S/manager-0", config(0, DataflowType::Binary), ProcessingType::Thread, EchoHooks, FakeClock::new()).expect("manager"));
    manager.results().push(Payload::Binary(vec![1, 2, 3]));

    let sink = FakeResultSink::new();
    let mut handle = spawn(vec![ForwarderTarget { manager: manager.clone(), sink: Some(Box::new(sink.clone())) }]);

    assert!(wait_until(2, || sink.sent().len() == 1));
    handle.stop();
    handle.join();

    assert_eq!(sink.sent(), vec![vec![1, 2, 3]]);
    assert!(manager.results().is_empty());
}

#[test]
fn string_dataflow_results_are_sent_as_utf8_text() {
    let manager = Arc::new(WorkerManager::new("S/manager-0", config(0, DataflowType::String), ProcessingType::Thread, EchoHooks, FakeClock::new()).expect("manager"));
    manager.results().push(Payload::Text("hello".to_string()));

    let sink = FakeResultSink::new();
    let mut handle = spawn(vec![ForwarderTarget { manager, sink: Some(Box::new(sink.clone())) }]);

    assert!(wait_until(2, || sink.sent().len() == 1));
    handle.stop();
    handle.join();

    assert_eq!(sink.sent(), vec![b"hello".to_vec()]);
}

#[test]
fn a_manager_with_no_egress_socket_is_simply_skipped() {
    let manager = Arc::new(WorkerManager::new("S/manager-0", config(0, DataflowType::Binary), ProcessingType::Thread, EchoHooks, FakeClock::new()).expect("manager"));
    manager.results().push(Payload::Binary(vec![9]));

    let mut handle = spawn(vec![ForwarderTarget::<EchoHooks, FakeClock> { manager: manager.clone(), sink: None }]);
    std::thread::sleep(Duration::from_millis(50));
    handle.stop();
    handle.join();

    assert_eq!(manager.results().len(), 1);
}
