//! Injected clock abstraction.
//!
//! Session stamps and idle detection never read ambient time directly;
//! every component takes a [`Clock`] so tests can simulate time instead
//! of racing real timers.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, Utc};

/// Time source for everything that stamps or compares instants.
///
/// `now_local` exists because time-of-day bucketing follows the user's
/// wall clock, while stored timestamps are always UTC.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current instant with the local offset applied.
    fn now_local(&self) -> DateTime<FixedOffset>;
}

/// Production clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Create a clock frozen at `start`, reporting UTC as local time.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_offset(start, FixedOffset::east_opt(0).expect("zero offset"))
    }

    /// Create a clock frozen at `start` with a fixed local offset.
    pub fn with_offset(start: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(start),
            offset,
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }

    fn now_local(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
        clock.advance(Duration::minutes(25));
        assert_eq!(
            clock.now(),
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 25, 0).unwrap()
        );
    }

    #[test]
    fn manual_clock_applies_local_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock =
            ManualClock::with_offset(Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap(), offset);
        assert_eq!(clock.now_local().hour(), 7);
    }
}
