//! Utility functions and helpers.

pub mod http;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

/// Offset for the shop's local day.
pub fn shop_offset(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours * 3600)
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
}

/// Today's date string (`YYYY-MM-DD`) in the shop's local day.
pub fn today_string(now: DateTime<Utc>, utc_offset_hours: i32) -> String {
    now.with_timezone(&shop_offset(utc_offset_hours))
        .format("%Y-%m-%d")
        .to_string()
}

/// Local date string for an arbitrary timestamp.
pub fn local_date_string(at: DateTime<Utc>, utc_offset_hours: i32) -> String {
    today_string(at, utc_offset_hours)
}

/// Midnight of a `YYYY-MM-DD` date in the shop's local day, as UTC.
pub fn local_midnight(date: &str, utc_offset_hours: i32) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let offset = shop_offset(utc_offset_hours);
    offset
        .from_local_datetime(&naive.and_hms_opt(0, 0, 0)?)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
