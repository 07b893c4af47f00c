// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn local_control_flags_default_to_zero() {
    let flags = ControlFlags::local();
    assert!(!flags.processdata());
    assert!(!flags.stopdata());
    flags.set_processdata(true);
    assert!(flags.processdata());
    flags.set_stopdata(true);
    assert!(flags.stopdata());
}

#[test]
fn local_metrics_publish_and_snapshot_round_trip() {
    let metrics = MetricsRegion::local(2);
    metrics.publish(0, 12.5, 100.0, WorkerStatus::Processing);
    metrics.publish(1, 0.0, 0.0, WorkerStatus::Idle);

    let snapshot = metrics.snapshot(2);
    assert_eq!(snapshot[0], (12.5, 100.0, WorkerStatus::Processing.as_i32()));
    assert_eq!(snapshot[1], (0.0, 0.0, WorkerStatus::Idle.as_i32()));
}

#[test]
fn shared_region_survives_reopen_at_the_same_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("region.bin");

    let created = SharedRegion::create(&path, 3).expect("create");
    created.publish_slot(1, 7.0, 42.0, WorkerStatus::Stopped);
    created.processdata().store(1, std::sync::atomic::Ordering::SeqCst);

    let reopened = SharedRegion::open(&path).expect("open");
    assert_eq!(reopened.processdata().load(std::sync::atomic::Ordering::SeqCst), 1);
    let snapshot = reopened.snapshot_slots(3);
    assert_eq!(snapshot[1], (7.0, 42.0, WorkerStatus::Stopped.as_i32()));
    assert_eq!(snapshot[0], (0.0, 0.0, WorkerStatus::Idle.as_i32()));
}

#[test]
fn region_size_matches_header_plus_slots() {
    assert_eq!(SharedRegion::region_size(0), HEADER_BYTES);
    assert_eq!(SharedRegion::region_size(4), HEADER_BYTES + 4 * SLOT_BYTES);
}
