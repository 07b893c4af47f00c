// SPDX-License-Identifier: MIT

//! Clock abstraction for testable time handling.
//!
//! The worker rate window (10s), the monitoring reporter cadence (1s), and
//! the `cleanedshutdown` poll interval (100ms) are all expressed in terms of
//! this trait so tests can advance time deterministically instead of
//! sleeping.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use std::sync::Arc;

/// A clock that provides the current time.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_seconds(&self) -> f64;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_seconds(&self) -> f64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
    }
}

/// Fake clock for testing with controllable time.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    epoch: Arc<Mutex<f64>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { current: Arc::new(Mutex::new(Instant::now())), epoch: Arc::new(Mutex::new(1_700_000_000.0)) }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
        *self.epoch.lock() += duration.as_secs_f64();
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn epoch_seconds(&self) -> f64 {
        *self.epoch.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
