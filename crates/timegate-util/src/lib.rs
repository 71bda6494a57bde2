//! Shared utilities for timegated
//!
//! This crate provides:
//! - The `IdentityId` handle type
//! - Local-clock time helpers (the access windows are timezone-naive)
//! - Duration string parsing ("2h", "1h30m", ...)

mod duration;
mod ids;
mod time;

pub use duration::*;
pub use ids::*;
pub use time::*;
