//! Time sources for the timer.
//!
//! The state machine never reads the clock itself; hosts pass `now` in. The
//! [`Clock`] trait is the seam the daemon and the foreground session use to
//! obtain that instant, so tests can drive time by hand.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A monotonic "now" provider.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;
}

/// Clock backed by tokio's time driver.
///
/// Follows `tokio::time::pause()` / `advance()` in tests, and the real
/// monotonic clock otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Instant::now())
    }

    /// Creates a clock frozen at `instant`.
    #[must_use]
    pub fn at(instant: Instant) -> Self {
        Self {
            now: Mutex::new(instant),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
