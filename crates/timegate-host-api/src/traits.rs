//! Hosting-environment traits

use async_trait::async_trait;
use thiserror::Error;
use timegate_util::IdentityId;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Identity not connected: {0}")]
    NotConnected(IdentityId),

    #[error("Disconnect failed: {0}")]
    DisconnectFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// The hosting environment's view of connected sessions.
///
/// `connected_identities` is a read-only snapshot taken at call time; the
/// enforcement loop never mutates it. `disconnect` forcibly ends the
/// identity's session, showing `message` to the user.
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// Snapshot of currently connected identities.
    fn connected_identities(&self) -> Vec<IdentityId>;

    /// Forcibly end an identity's session with a user-facing message.
    async fn disconnect(&self, identity: &IdentityId, message: &str) -> HostResult<()>;
}

/// Outcome of a login-time gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginDecision {
    Admit,
    Deny { message: String },
}

/// Login-time hook: evaluated synchronously before a connection is admitted.
/// A `Deny` must prevent the connection from completing.
pub trait LoginGate: Send + Sync {
    fn decide(&self, identity: &IdentityId) -> LoginDecision;
}

/// Errors from identity resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No identity found for name {0:?}")]
    NotFound(String),

    #[error("Directory lookup failed: {0}")]
    Lookup(String),
}

/// External name-to-identity resolution over a remote directory.
///
/// The core treats the handle as opaque and does not retry or cache lookups.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<IdentityId, ResolveError>;
}
