//! Time provider abstraction
//!
//! Receipt capture timestamps come from a [`Clock`] so production code uses the
//! system time while tests pin it to known instants.
//!
//! # Example
//!
//! ```
//! use canhoto::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let captured_at = clock.now();
//! assert!(clock.now() >= captured_at);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider for capture timestamps.
///
/// Timestamps are persisted with millisecond precision, so implementations
/// return instants truncated to whole milliseconds. A value returned by
/// `now()` survives a store round trip unchanged.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64;

    /// Returns the current time, truncated to milliseconds.
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Test clock that only moves when told to.
///
/// # Example
///
/// ```
/// use canhoto::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1_704_067_200_000);
/// assert_eq!(clock.now_millis(), clock.now_millis());
/// clock.advance(500);
/// assert_eq!(clock.now_millis(), 1_704_067_200_500);
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    millis: Mutex<i64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a new fixed clock at the given time in milliseconds.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: i64) {
        *self.millis.lock().unwrap() += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: i64) {
        *self.millis.lock().unwrap() = ms;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        *self.millis.lock().unwrap()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &*self.millis.lock().unwrap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_millisecond_precise() {
        let now = SystemClock.now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn fixed_clock_is_stable_until_moved() {
        let clock = FixedClock::default();
        let t1 = clock.now();
        assert_eq!(clock.now(), t1);

        clock.advance(1_000);
        assert_eq!((clock.now() - t1).num_milliseconds(), 1_000);

        clock.set(0);
        assert_eq!(clock.now().timestamp(), 0);
    }
}
