//! Calendar-day bucketing shared by the stats and cortisol services.
//!
//! Days are UTC calendar dates: a timestamp belongs to the day obtained by
//! truncating its UTC time to midnight.

use chrono::{DateTime, Duration, NaiveDate, Utc};

pub fn day_key(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Every calendar day from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let len = if start > end {
        0
    } else {
        (end - start).num_days() + 1
    };
    (0..len).map(move |offset| start + Duration::days(offset))
}
