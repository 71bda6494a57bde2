//! Store trait definitions

use chrono::NaiveDateTime;
use timegate_util::IdentityId;

use crate::{AccessRecord, StoreResult};

/// Durable CRUD over access records, keyed uniquely by identity.
///
/// Every operation is atomic at single-record granularity; concurrent calls
/// for the same identity from the login hook and the sweep may interleave but
/// never corrupt a record. Deletes are idempotent.
pub trait AccessStore: Send + Sync {
    /// Insert or replace the record for its identity (all fields overwritten).
    fn upsert(&self, record: &AccessRecord) -> StoreResult<()>;

    /// Raw lookup by identity.
    fn find_by_identity(&self, identity: &IdentityId) -> StoreResult<Option<AccessRecord>>;

    /// Delete the record for an identity. Returns whether a row was removed;
    /// deleting an absent identity is a no-op, not an error.
    fn delete_by_identity(&self, identity: &IdentityId) -> StoreResult<bool>;

    /// Bulk janitor sweep: delete all non-permanent records whose window has
    /// closed, i.e. `window_end <= now`. The boundary is inclusive on
    /// purpose: the window is half-open and the evaluator reads
    /// `now >= window_end` as expired, so the janitor must agree. Returns the
    /// number of rows removed. Independent of the per-check lazy delete.
    fn delete_expired(&self, now: NaiveDateTime) -> StoreResult<usize>;

    /// Check if the store is reachable.
    fn is_healthy(&self) -> bool;
}
