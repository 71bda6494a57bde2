//! Time helpers for timegated
//!
//! Access windows use timezone-naive local clock semantics: timestamps are
//! stored without an offset and compared against the enforcing host's local
//! clock. All wall-clock reads go through [`now`] so the choice lives in one
//! place.

use chrono::{Local, NaiveDateTime, Timelike};
use std::time::Duration;

/// Storage and display format for window timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, without offset, truncated to whole seconds to match
/// the storage granularity.
pub fn now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Drop sub-second precision. Window timestamps are second-granular
/// everywhere; anything finer would be lost on the first store roundtrip.
pub fn truncate_to_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Format a window timestamp for user-facing messages.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a timestamp in the storage format.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn datetime_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2025, 12, 25)
            .unwrap()
            .and_hms_opt(14, 30, 45)
            .unwrap();
        let s = format_datetime(&dt);
        assert_eq!(s, "2025-12-25 14:30:45");
        assert_eq!(parse_datetime(&s).unwrap(), dt);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_datetime("not a date").is_err());
        assert!(parse_datetime("2025-12-25").is_err());
    }

    #[test]
    fn now_is_second_granular() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn truncation_drops_nanos_only() {
        let dt = NaiveDate::from_ymd_opt(2025, 12, 25)
            .unwrap()
            .and_hms_nano_opt(14, 30, 45, 491_552_428)
            .unwrap();
        let truncated = truncate_to_seconds(dt);
        assert_eq!(truncated.nanosecond(), 0);
        assert_eq!(format_datetime(&truncated), "2025-12-25 14:30:45");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
        assert_eq!(format_duration(Duration::from_secs(90000)), "1d 1h 0m");
    }
}
