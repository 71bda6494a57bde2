//! Pure access evaluation

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use timegate_store::AccessRecord;

/// Computed access status. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    /// Inside the window, or permanent
    Valid,
    /// Record exists but the window has not opened yet
    NotStarted,
    /// The window has closed
    Expired,
    /// No record on file
    NoAccess,
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessStatus::Valid => "valid",
            AccessStatus::NotStarted => "not_started",
            AccessStatus::Expired => "expired",
            AccessStatus::NoAccess => "no_access",
        };
        write!(f, "{}", s)
    }
}

/// Evaluate a record against an instant.
///
/// Pure and total: no side effects, deterministic, safe to call repeatedly
/// with the same inputs. The window is half-open: valid iff
/// `window_start <= now < window_end`. A non-permanent record whose window is
/// inverted (`window_end <= window_start`) is treated as always expired.
pub fn evaluate(record: Option<&AccessRecord>, now: NaiveDateTime) -> AccessStatus {
    let Some(record) = record else {
        return AccessStatus::NoAccess;
    };

    if record.permanent {
        return AccessStatus::Valid;
    }

    if record.window_end <= record.window_start {
        return AccessStatus::Expired;
    }

    if now >= record.window_end {
        AccessStatus::Expired
    } else if now < record.window_start {
        AccessStatus::NotStarted
    } else {
        AccessStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use timegate_util::IdentityId;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn record(start: NaiveDateTime, end: NaiveDateTime, permanent: bool) -> AccessRecord {
        AccessRecord::new(IdentityId::random(), "alice", start, end, permanent)
    }

    #[test]
    fn no_record_is_no_access() {
        assert_eq!(evaluate(None, at(12, 0)), AccessStatus::NoAccess);
    }

    #[test]
    fn permanent_is_always_valid() {
        let rec = record(at(14, 0), at(16, 0), true);
        assert_eq!(evaluate(Some(&rec), at(0, 0)), AccessStatus::Valid);
        assert_eq!(evaluate(Some(&rec), at(15, 0)), AccessStatus::Valid);
        assert_eq!(evaluate(Some(&rec), at(23, 59)), AccessStatus::Valid);
    }

    #[test]
    fn window_is_half_open() {
        let rec = record(at(14, 0), at(16, 0), false);
        assert_eq!(evaluate(Some(&rec), at(13, 59)), AccessStatus::NotStarted);
        // Start is inclusive
        assert_eq!(evaluate(Some(&rec), at(14, 0)), AccessStatus::Valid);
        assert_eq!(evaluate(Some(&rec), at(15, 59)), AccessStatus::Valid);
        // End is exclusive
        assert_eq!(evaluate(Some(&rec), at(16, 0)), AccessStatus::Expired);
        assert_eq!(evaluate(Some(&rec), at(20, 0)), AccessStatus::Expired);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let rec = record(at(14, 0), at(16, 0), false);
        let now = at(15, 0);
        assert_eq!(evaluate(Some(&rec), now), evaluate(Some(&rec), now));
    }

    #[test]
    fn inverted_window_is_always_expired() {
        let rec = record(at(16, 0), at(14, 0), false);
        assert_eq!(evaluate(Some(&rec), at(12, 0)), AccessStatus::Expired);
        assert_eq!(evaluate(Some(&rec), at(15, 0)), AccessStatus::Expired);
        assert_eq!(evaluate(Some(&rec), at(20, 0)), AccessStatus::Expired);

        // Empty window too
        let rec = record(at(14, 0), at(14, 0), false);
        assert_eq!(evaluate(Some(&rec), at(14, 0)), AccessStatus::Expired);
    }

    #[test]
    fn window_laws_hold_across_the_day() {
        let rec = record(at(9, 0), at(17, 0), false);
        for hour in 0..24 {
            let now = at(hour, 30);
            let status = evaluate(Some(&rec), now);
            if now < rec.window_start {
                assert_eq!(status, AccessStatus::NotStarted);
            } else if now >= rec.window_end {
                assert_eq!(status, AccessStatus::Expired);
            } else {
                assert_eq!(status, AccessStatus::Valid);
            }
        }
    }

    #[test]
    fn one_second_windows_behave() {
        let start = at(12, 0);
        let rec = record(start, start + Duration::seconds(1), false);
        assert_eq!(evaluate(Some(&rec), start), AccessStatus::Valid);
        assert_eq!(
            evaluate(Some(&rec), start + Duration::seconds(1)),
            AccessStatus::Expired
        );
    }
}
