//! Wall clock abstraction.

use std::sync::Mutex;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use codex_core::{EpochMillis, DAY_FORMAT};

/// Source of the current time. Calendar days are local days.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;

    /// Current time in epoch milliseconds.
    fn now_millis(&self) -> EpochMillis {
        self.now().timestamp_millis()
    }

    /// Current local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    /// Clock stopped at `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock stopped at a local wall-clock time. `None` when that time does
    /// not exist in the local zone (DST gap).
    pub fn at(naive: NaiveDateTime) -> Option<Self> {
        Local.from_local_datetime(&naive).earliest().map(Self::new)
    }

    /// Clock stopped at noon of `day`.
    pub fn at_noon(day: NaiveDate) -> Option<Self> {
        Self::at(day.and_hms_opt(12, 0, 0)?)
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Local calendar day of an epoch-millisecond timestamp.
pub fn day_of(timestamp: EpochMillis) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(timestamp)
        .earliest()
        .map(|t| t.date_naive())
}

/// `YYYY-MM-DD` string of a day.
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DAY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let clock = FixedClock::at_noon(day).unwrap();
        assert_eq!(clock.today(), day);

        clock.advance(Duration::days(1));
        assert_eq!(clock.today(), day.succ_opt().unwrap());
    }

    #[test]
    fn test_day_roundtrip() {
        let day = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(format_day(day), "2023-01-05");
        assert_eq!(parse_day("2023-01-05"), Some(day));
        assert_eq!(parse_day("yesterday"), None);
    }

    #[test]
    fn test_day_of_matches_clock() {
        let clock = FixedClock::at_noon(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()).unwrap();
        assert_eq!(day_of(clock.now_millis()), Some(clock.today()));
    }
}
