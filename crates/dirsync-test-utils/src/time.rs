//! Fixed timestamps for test fixtures.

use chrono::{DateTime, NaiveDate, Utc};

/// Midnight UTC on the given `YYYY-MM-DD` date.
///
/// # Panics
/// Panics if `day` is not a valid date.
pub fn date(day: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("date: invalid date {day:?}: {e}"))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| panic!("date: invalid midnight for {day:?}"))
        .and_utc()
}

/// UTC timestamp from a `YYYY-MM-DD HH:MM:SS` string.
///
/// # Panics
/// Panics if `stamp` does not parse.
pub fn datetime(stamp: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("datetime: invalid timestamp {stamp:?}: {e}"))
        .and_utc()
}
