//! Access record orchestration

use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;
use timegate_store::{AccessRecord, AccessStore, StoreError};
use timegate_util::IdentityId;
use tracing::{debug, info, warn};

use crate::{AccessStatus, evaluate};

/// Errors surfaced to administrative callers
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("An access record already exists for {0}")]
    AlreadyExists(IdentityId),

    #[error("Window end must be after window start")]
    InvalidWindow,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates store reads/writes around evaluation.
///
/// Enforcement fails closed: any store failure during a check surfaces as
/// `NoAccess` rather than propagating, so a flaky database denies logins
/// instead of crashing the sweep or admitting everyone.
pub struct AccessManager {
    store: Arc<dyn AccessStore>,
}

impl AccessManager {
    pub fn new(store: Arc<dyn AccessStore>) -> Self {
        Self { store }
    }

    /// Create a new access record. Never overwrites: if a record already
    /// exists for the identity the call fails with `AlreadyExists` and the
    /// existing record is left untouched.
    pub fn create_access(
        &self,
        identity: IdentityId,
        display_name: impl Into<String>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        permanent: bool,
    ) -> Result<AccessRecord, AccessError> {
        if !permanent && window_end <= window_start {
            return Err(AccessError::InvalidWindow);
        }

        if self.store.find_by_identity(&identity)?.is_some() {
            return Err(AccessError::AlreadyExists(identity));
        }

        let record = AccessRecord::new(identity, display_name, window_start, window_end, permanent);
        self.store.upsert(&record)?;

        info!(
            identity = %record.identity,
            display_name = %record.display_name,
            window_end = %record.window_end,
            permanent = record.permanent,
            "Access record created"
        );

        Ok(record)
    }

    /// Delete the record for an identity. Returns whether a deletion
    /// occurred; absent records (and store failures) yield false.
    pub fn remove_access(&self, identity: &IdentityId) -> bool {
        match self.store.delete_by_identity(identity) {
            Ok(removed) => {
                if removed {
                    info!(identity = %identity, "Access record removed");
                }
                removed
            }
            Err(e) => {
                warn!(identity = %identity, error = %e, "Failed to remove access record");
                false
            }
        }
    }

    /// Raw lookup, no evaluation. Store failures read as absent.
    pub fn get_access(&self, identity: &IdentityId) -> Option<AccessRecord> {
        match self.store.find_by_identity(identity) {
            Ok(record) => record,
            Err(e) => {
                warn!(identity = %identity, error = %e, "Store lookup failed");
                None
            }
        }
    }

    /// Look up and evaluate an identity at the current instant.
    ///
    /// This is a read plus a conditional write: when (and only when) the
    /// computed status is `Expired`, the record is deleted before returning,
    /// and the caller still receives the stale record for message
    /// construction. Expiry is detected lazily, on the next check. The
    /// delete is idempotent: a second call after deletion returns
    /// `(NoAccess, None)`.
    pub fn check_access(&self, identity: &IdentityId) -> (AccessStatus, Option<AccessRecord>) {
        let record = match self.store.find_by_identity(identity) {
            Ok(record) => record,
            Err(e) => {
                // Fail closed: deny on uncertainty, never crash the caller
                warn!(identity = %identity, error = %e, "Store lookup failed, denying");
                return (AccessStatus::NoAccess, None);
            }
        };

        let status = evaluate(record.as_ref(), timegate_util::now());

        if status == AccessStatus::Expired {
            // Lazy delete-on-observe; a concurrent check racing us deletes
            // the same row harmlessly
            if let Err(e) = self.store.delete_by_identity(identity) {
                warn!(identity = %identity, error = %e, "Failed to delete expired record");
            } else {
                debug!(identity = %identity, "Expired access record deleted");
            }
        }

        (status, record)
    }

    /// True iff `check_access` yields `Valid`.
    pub fn has_valid_access(&self, identity: &IdentityId) -> bool {
        self.check_access(identity).0 == AccessStatus::Valid
    }

    /// Bulk janitor sweep: drop every non-permanent record whose window has
    /// already closed. Independent of the per-check lazy delete.
    pub fn purge_expired(&self) -> usize {
        match self.store.delete_expired(timegate_util::now()) {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "Purged expired access records");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Expired record purge failed");
                0
            }
        }
    }
}
