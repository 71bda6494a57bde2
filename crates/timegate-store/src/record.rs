//! Access record type

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use timegate_util::{IdentityId, truncate_to_seconds};

/// A persisted access grant for one identity.
///
/// The window is the half-open interval `[window_start, window_end)` in
/// timezone-naive local time. When `permanent` is true the window is ignored
/// for validity but kept for display. The store enforces at most one record
/// per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Unique key
    pub identity: IdentityId,

    /// Human-readable label, informational only
    pub display_name: String,

    /// Window open, inclusive
    pub window_start: NaiveDateTime,

    /// Window close, exclusive
    pub window_end: NaiveDateTime,

    /// Always valid regardless of window
    pub permanent: bool,
}

impl AccessRecord {
    /// Window bounds are truncated to whole seconds so the record handed
    /// back to the caller is identical to what a store roundtrip yields.
    pub fn new(
        identity: IdentityId,
        display_name: impl Into<String>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        permanent: bool,
    ) -> Self {
        Self {
            identity,
            display_name: display_name.into(),
            window_start: truncate_to_seconds(window_start),
            window_end: truncate_to_seconds(window_end),
            permanent,
        }
    }
}
