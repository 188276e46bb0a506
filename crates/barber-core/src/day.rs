//! # Day Windows
//!
//! Half-open `[start, end)` UTC intervals covering one calendar day in the
//! shop's timezone.
//!
//! ## Why Not Compare Date Strings?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "today" = visit_time >= "2024-03-10T00:00:00"                         │
//! │            visit_time <  "2024-03-10T23:59:59"                         │
//! │                                                                         │
//! │  ✗ The date is taken in UTC, the shop is not in UTC                    │
//! │  ✗ The last second of the day is silently dropped                      │
//! │  ✗ A 23h or 25h DST day is treated as 24h                              │
//! │                                                                         │
//! │  DayWindow::for_date(2024-03-10, shop_tz)                              │
//! │    start = first instant of 2024-03-10 in shop_tz (as UTC)             │
//! │    end   = first instant of 2024-03-11 in shop_tz (as UTC)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for `date` as observed in `tz`.
    ///
    /// Returns `None` only if the date is at the edge of chrono's range.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<Self> {
        let start = start_of_day(date, tz)?;
        let end = start_of_day(date.succ_opt()?, tz)?;
        Some(DayWindow { start, end })
    }

    /// Window for the local day that contains `instant` in `tz`.
    pub fn containing<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Option<Self> {
        let local_date = instant.with_timezone(tz).date_naive();
        Self::for_date(local_date, tz)
    }

    /// Returns true if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the day (23h, 24h or 25h around DST changes).
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// First valid local instant of `date` in `tz`.
///
/// Midnight can fall into a DST gap; the first valid quarter hour after it is
/// used instead.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;

    (0..96)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_window_for_date_in_positive_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let window = DayWindow::for_date(date, &tz).unwrap();
        assert_eq!(window.start, utc("2024-03-09T22:00:00Z"));
        assert_eq!(window.end, utc("2024-03-10T22:00:00Z"));
        assert_eq!(window.duration(), Duration::hours(24));
    }

    #[test]
    fn test_window_is_half_open() {
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), &Utc).unwrap();

        assert!(window.contains(window.start));
        assert!(window.contains(utc("2024-03-10T23:59:59.999Z")));
        assert!(!window.contains(window.end));
        assert!(!window.contains(utc("2024-03-09T23:59:59Z")));
    }

    #[test]
    fn test_containing_uses_local_date() {
        // 23:00 UTC is already the next day at +02:00.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = DayWindow::containing(utc("2024-03-09T23:00:00Z"), &tz).unwrap();
        assert_eq!(window.start, utc("2024-03-09T22:00:00Z"));

        // And still the previous day at -05:00.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = DayWindow::containing(utc("2024-03-11T03:00:00Z"), &tz).unwrap();
        assert_eq!(window.start, utc("2024-03-10T05:00:00Z"));
        assert_eq!(window.end, utc("2024-03-11T05:00:00Z"));
    }
}
