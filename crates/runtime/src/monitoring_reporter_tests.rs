// SPDX-License-Identifier: MIT

use super::*;
use crate::queue::{PriorityQueues, ResultQueue};
use crate::shared_region::{ControlFlags, MetricsRegion};
use rtadp_core::SystemClock;
use rtadp_transport::fake::FakeMonitoringSink;
use std::time::Duration;

fn test_point() -> Arc<MonitoringPoint<SystemClock>> {
    Arc::new(
        MonitoringPoint::new(
            "OOQS1/manager-0",
            SystemClock,
            PriorityQueues::new(),
            ResultQueue::new(),
            ControlFlags::local(),
            MetricsRegion::local(1),
            1,
        )
        .without_cpu_probe(),
    )
}

#[test]
fn broadcasts_at_least_once_within_a_couple_cadences() {
    let sink = FakeMonitoringSink::new();
    let (join, handle) = spawn(test_point(), sink.clone(), Duration::from_millis(20));

    std::thread::sleep(Duration::from_millis(80));
    handle.stop();
    join.join().expect("reporter thread");

    let sent = sink.sent();
    assert!(!sent.is_empty(), "expected at least one broadcast snapshot");
    assert!(sent[0].contains("\"pidtarget\":\"*\""));
}

#[test]
fn serves_a_directed_request_addressed_to_the_requester() {
    let sink = FakeMonitoringSink::new();
    let (join, handle) = spawn(test_point(), sink.clone(), Duration::from_secs(10));

    handle.request_directed("Q");
    std::thread::sleep(Duration::from_millis(100));
    handle.stop();
    join.join().expect("reporter thread");

    let sent = sink.sent();
    assert!(sent.iter().any(|s| s.contains("\"pidtarget\":\"Q\"")));
}

#[test]
fn stops_promptly_when_signaled() {
    let sink = FakeMonitoringSink::new();
    let (join, handle) = spawn(test_point(), sink, Duration::from_secs(10));
    handle.stop();
    join.join().expect("reporter thread should terminate");
}
