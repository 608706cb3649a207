//! Wall-clock source for the recency bonus and last-novel timestamps.
//!
//! Timestamps are milliseconds since the Unix epoch as `f64`, so a manual
//! clock can advance by fractional frame intervals.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Current UTC time as Unix milliseconds.
pub fn now_unix_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

/// Reads the system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        now_unix_ms()
    }
}

/// Clock that only moves when told to. Used for offline analysis, where
/// frames arrive faster than real time, and for tests.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance_ms(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set_ms(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_704_067_200_000.0);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1000.0);
        clock.advance_ms(16.5);
        assert_eq!(clock.now_ms(), 1016.5);
        clock.set_ms(0.0);
        assert_eq!(clock.now_ms(), 0.0);
    }
}
