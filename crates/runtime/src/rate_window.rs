// SPDX-License-Identifier: MIT

//! The 10-second recurring rate computation shared by both worker flavors
//! (§4.D): `processing_rate = processed_in_window / window_seconds`, added
//! to a monotonic running total, then the window counter resets.
//!
//! Modeled as a plain value checked once per loop iteration rather than a
//! dedicated timer thread — "cancelled on stop" then falls out for free
//! when the owning loop exits.

use std::time::Duration;

use rtadp_core::Clock;

/// Default window: 10 seconds, per the component design.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

pub struct RateWindow<C: Clock> {
    clock: C,
    window: Duration,
    window_start: std::time::Instant,
    processed_in_window: u64,
    total_processed: f64,
}

impl<C: Clock> RateWindow<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        let window_start = clock.now();
        Self { clock, window, window_start, processed_in_window: 0, total_processed: 0.0 }
    }

    pub fn record_processed(&mut self) {
        self.processed_in_window += 1;
    }

    /// Checks whether the window has elapsed; if so, computes
    /// `(rate, total_processed)` and resets the window. Returns `None`
    /// when the window has not yet elapsed — callers keep their last
    /// published values in that case.
    pub fn tick(&mut self) -> Option<(f64, f64)> {
        let elapsed = self.clock.now().duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let rate = self.processed_in_window as f64 / self.window.as_secs_f64();
        self.total_processed += self.processed_in_window as f64;
        self.processed_in_window = 0;
        self.window_start = self.clock.now();
        Some((rate, self.total_processed))
    }
}

#[cfg(test)]
#[path = "rate_window_tests.rs"]
mod tests;
