// SPDX-License-Identifier: MIT

use super::*;
use rtadp_core::FakeClock;
use std::time::Duration;

#[test]
fn tick_is_none_before_the_window_elapses() {
    let clock = FakeClock::new();
    let mut window = RateWindow::new(clock.clone(), Duration::from_secs(10));
    window.record_processed();
    clock.advance(Duration::from_secs(5));
    assert!(window.tick().is_none());
}

#[test]
fn tick_computes_rate_and_accumulates_total_at_window_boundary() {
    let clock = FakeClock::new();
    let mut window = RateWindow::new(clock.clone(), Duration::from_secs(10));
    for _ in 0..20 {
        window.record_processed();
    }
    clock.advance(Duration::from_secs(10));
    let (rate, total) = window.tick().expect("window elapsed");
    assert_eq!(rate, 2.0);
    assert_eq!(total, 20.0);
}

#[test]
fn window_resets_and_accumulates_across_multiple_ticks() {
    let clock = FakeClock::new();
    let mut window = RateWindow::new(clock.clone(), Duration::from_secs(10));
    for _ in 0..10 {
        window.record_processed();
    }
    clock.advance(Duration::from_secs(10));
    let (_, total_first) = window.tick().expect("first tick");
    assert_eq!(total_first, 10.0);

    for _ in 0..5 {
        window.record_processed();
    }
    clock.advance(Duration::from_secs(10));
    let (rate_second, total_second) = window.tick().expect("second tick");
    assert_eq!(rate_second, 0.5);
    assert_eq!(total_second, 15.0);
}

#[test]
fn empty_window_reports_zero_rate_without_regressing_total() {
    let clock = FakeClock::new();
    let mut window = RateWindow::new(clock.clone(), Duration::from_secs(10));
    clock.advance(Duration::from_secs(10));
    let (rate, total) = window.tick().expect("window elapsed");
    assert_eq!(rate, 0.0);
    assert_eq!(total, 0.0);
}
