// SPDX-License-Identifier: MIT

use super::*;
use rtadp_core::config::ManagerConfig;
use rtadp_core::error::{DecodeError, ProcessingError};
use rtadp_core::{FakeClock, ProcessingType};
use rtadp_transport::fake::FakeDataSource;
use std::time::Instant;

#[derive(Clone, Copy, Default)]
struct EchoHooks;

impl Hooks for EchoHooks {
    fn process_data(&self, payload: Payload, _priority: Priority) -> Result<Payload, ProcessingError> {
        Ok(payload)
    }
}

#[derive(Clone, Copy, Default)]
struct RejectingHooks;

impl Hooks for RejectingHooks {
    fn decode_data(&self, _bytes: Vec<u8>) -> Result<Payload, DecodeError> {
        Err(DecodeError("nope".to_string()))
    }

    fn process_data(&self, payload: Payload, _priority: Priority) -> Result<Payload, ProcessingError> {
        Ok(payload)
    }
}

fn manager_config() -> ManagerConfig {
    ManagerConfig {
        index: 0,
        result_socket: "none".to_string(),
        result_socket_type: rtadp_core::SocketType::Pushpull,
        result_dataflow_type: rtadp_core::DataflowType::Binary,
        num_workers: 0,
    }
}

fn new_manager(name: &str) -> Arc<WorkerManager<EchoHooks, FakeClock>> {
    Arc::new(WorkerManager::new(name, manager_config(), ProcessingType::Thread, EchoHooks, FakeClock::new()).expect("manager"))
}

fn wait_until(deadline_secs: u64, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(deadline_secs);
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn a_binary_ingestion_task_decodes_and_fans_out_to_every_manager() {
    let (tx, source) = FakeDataSource::channel();
    let managers = vec![new_manager("S/manager-0"), new_manager("S/manager-1")];
    let stopdata = Arc::new(AtomicBool::new(false));
    let running = Arc::new(AtomicBool::new(true));

    let handle = spawn(
        "hp",
        Priority::High,
        Box::new(source),
        managers.clone(),
        EchoHooks,
        DataflowType::Binary,
        stopdata,
        running.clone(),
    );

    tx.send(b"frame".to_vec()).expect("send");
    assert!(wait_until(2, || managers.iter().all(|m| m.queues().hp_len() == 1)));

    running.store(false, Ordering::SeqCst);
    let _ = handle.join();
}

#[test]
fn stopdata_suppresses_enqueue_without_stopping_receipt() {
    let (tx, source) = FakeDataSource::channel();
    let managers = vec![new_manager("S/manager-0")];
    let stopdata = Arc::new(AtomicBool::new(true));
    let running = Arc::new(AtomicBool::new(true));

    let handle = spawn(
        "lp",
        Priority::Low,
        Box::new(source),
        managers.clone(),
        EchoHooks,
        DataflowType::String,
        stopdata.clone(),
        running.clone(),
    );

    tx.send(b"ignored".to_vec()).expect("send");
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(managers[0].queues().lp_len(), 0);

    stopdata.store(false, Ordering::SeqCst);
    tx.send(b"accepted".to_vec()).expect("send");
    assert!(wait_until(2, || managers[0].queues().lp_len() == 1));

    running.store(false, Ordering::SeqCst);
    let _ = handle.join();
}

#[test]
fn a_failing_decode_data_call_drops_the_frame_without_enqueueing() {
    let (tx, source) = FakeDataSource::channel();
    let managers = vec![new_manager("S/manager-0")];
    let stopdata = Arc::new(AtomicBool::new(false));
    let running = Arc::new(AtomicBool::new(true));

    let handle = spawn(
        "hp",
        Priority::High,
        Box::new(source),
        managers.clone(),
        RejectingHooks,
        DataflowType::Binary,
        stopdata,
        running.clone(),
    );

    tx.send(b"frame".to_vec()).expect("send");
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(managers[0].queues().hp_len(), 0);

    running.store(false, Ordering::SeqCst);
    let _ = handle.join();
}
