// SPDX-License-Identifier: MIT

use super::*;
use rtadp_core::{FakeClock, Payload};

fn point() -> MonitoringPoint<FakeClock> {
    MonitoringPoint::new(
        "OOQS1/manager-0",
        FakeClock::new(),
        PriorityQueues::new(),
        ResultQueue::new(),
        ControlFlags::local(),
        MetricsRegion::local(2),
        2,
    )
    .without_cpu_probe()
}

#[test]
fn snapshot_reflects_live_queue_depths() {
    let p = point();
    p.queues.push_hp(Payload::Binary(vec![1]));
    p.queues.push_lp(Payload::Binary(vec![2]));
    p.queues.push_lp(Payload::Binary(vec![3]));
    p.results.push(Payload::Binary(vec![4]));

    let snap = p.snapshot();
    assert_eq!(snap.queue_hp_size, 1);
    assert_eq!(snap.queue_lp_size, 2);
    assert_eq!(snap.queue_result_size, 1);
}

#[test]
fn snapshot_reports_per_worker_metrics() {
    let p = point();
    p.metrics.publish(0, 5.0, 50.0, rtadp_core::WorkerStatus::Processing);
    p.metrics.publish(1, 0.0, 0.0, rtadp_core::WorkerStatus::Idle);

    let snap = p.snapshot();
    assert_eq!(snap.worker_rates[&0], 5.0);
    assert_eq!(snap.worker_tot_events[&0], 50);
    assert_eq!(snap.worker_status[&0], rtadp_core::WorkerStatus::Processing.as_i32());
    assert_eq!(snap.worker_status[&1], rtadp_core::WorkerStatus::Idle.as_i32());
}

#[test]
fn snapshot_broadcasts_to_wildcard_by_default() {
    let p = point();
    assert_eq!(p.snapshot().header.pidtarget, "*");
}

#[test]
fn snapshot_for_addresses_the_requester() {
    let p = point();
    assert_eq!(p.snapshot_for("Q").header.pidtarget, "Q");
}

#[test]
fn set_status_is_visible_via_get_status_and_snapshot() {
    let p = point();
    p.set_status(SupervisorState::Processing);
    assert_eq!(p.get_status(), SupervisorState::Processing);
    assert_eq!(p.snapshot().workermanagerstatus, SupervisorState::Processing);
}

#[test]
fn snapshot_reflects_stopdatainput_flag() {
    let p = point();
    assert!(!p.snapshot().stopdatainput);
    p.control.set_stopdata(true);
    assert!(p.snapshot().stopdatainput);
}

#[test]
fn update_records_extras_without_affecting_the_wire_snapshot() {
    let p = point();
    p.update("frames_dropped", 3.0);
    assert_eq!(p.extras().get("frames_dropped"), Some(&3.0));
}
