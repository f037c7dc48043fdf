//! Clock abstraction so admission decisions can be driven by a fake clock in tests

use parking_lot::Mutex;

/// Wall clock in fractional unix seconds.
///
/// Every process sharing a store must agree on time, so this is wall time rather than a
/// monotonic clock.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_secs(&self) -> f64;
}

/// System wall clock with microsecond resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Manually driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, secs: f64) {
        *self.now.lock() += secs;
    }

    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        *self.now.lock()
    }
}
