//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A cancellable repeating timer, driven by polling from a cyclic loop.
///
/// The timer fires at most once per call to `poll`. If several periods have elapsed since the
/// last poll the missed firings are dropped and the timer re-arms on the next period boundary
/// after `now`, so that a stalled loop does not produce a burst of firings.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_fire: DateTime<Utc>,
    cancelled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IntervalTimer {
    /// Start a new timer which will first fire one period after `now`.
    ///
    /// # Panics
    /// - If `period` is not strictly positive.
    pub fn start(period: Duration, now: DateTime<Utc>) -> Self {
        assert!(
            period > Duration::zero(),
            "IntervalTimer period must be positive"
        );

        Self {
            period,
            next_fire: now + period,
            cancelled: false,
        }
    }

    /// Check whether the timer has fired since the last poll.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.cancelled || now < self.next_fire {
            return false;
        }

        while self.next_fire <= now {
            self.next_fire = self.next_fire + self.period;
        }

        true
    }

    /// Stop the timer, after which it will never fire again.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Time at which the timer will next fire, or `None` if it was cancelled.
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        match self.cancelled {
            true => None,
            false => Some(self.next_fire),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a number of seconds into a duration, rounding to the nearest millisecond.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}
