//! Strongly-typed identity handle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::{Uuid, uuid};

/// Stable unique handle for a user, independent of display name.
///
/// The identity is the unique key for access records; display names are
/// informational only and never used for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(Uuid);

impl IdentityId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random identity (mostly useful in tests).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Break-glass administrative identity, exempt from all access checks.
///
/// Overridable via `[service] bypass_identity` in the config file.
pub const DEFAULT_BYPASS_IDENTITY: IdentityId =
    IdentityId::from_uuid(uuid!("5269cc22-14b3-443a-9519-92ff373fd76c"));
