//! ISO-8601 timestamp parsing and formatting.
//!
//! All store timestamps are naive local times. Inputs that carry a UTC
//! offset are converted to local time before the offset is dropped.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date or date-time string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS[.ffffff]`
/// (with `T` or a space as separator), and RFC 3339 strings with an offset.
/// A bare date resolves to midnight.
pub fn parse_iso(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|aware| aware.with_timezone(&Local).naive_local())
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS`, appending fractional
/// seconds only when they are non-zero.
pub fn format_iso(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}
