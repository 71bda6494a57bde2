//! Access evaluation and continuous enforcement for timegated
//!
//! This crate is the heart of timegated, containing:
//! - The pure access evaluator (record + instant -> status)
//! - `AccessManager`, which wraps the store with evaluate-and-reconcile
//!   semantics (lazy delete of expired records, fail-closed on store errors)
//! - `GateDecision`, the synchronous login-time hook
//! - `EnforcementLoop`, the 1-second re-check over connected identities

mod gate;
mod manager;
mod messages;
mod status;
mod sweep;

pub use gate::*;
pub use manager::*;
pub use messages::*;
pub use status::*;
pub use sweep::*;
