//! Login-time gate

use std::sync::Arc;
use timegate_host_api::{LoginDecision, LoginGate};
use timegate_util::IdentityId;
use tracing::info;

use crate::{AccessManager, AccessStatus, Messages};

/// Typed outcome of a gate check, before flattening to the host's
/// admit/deny shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Admit,
    Deny {
        status: AccessStatus,
        message: String,
    },
}

/// Evaluates a single identity synchronously at connection time.
///
/// Holds an explicit `AccessManager` reference passed at construction; no
/// global lookup. A denied connection must never be handed a usable session.
pub struct GateDecision {
    manager: Arc<AccessManager>,
    bypass: IdentityId,
    messages: Messages,
}

impl GateDecision {
    pub fn new(manager: Arc<AccessManager>, bypass: IdentityId, messages: Messages) -> Self {
        Self {
            manager,
            bypass,
            messages,
        }
    }

    pub fn check(&self, identity: &IdentityId) -> GateOutcome {
        if *identity == self.bypass {
            info!(identity = %identity, "Login admitted via bypass identity");
            return GateOutcome::Admit;
        }

        let (status, record) = self.manager.check_access(identity);

        // Status and message always agree; a check without a record can only
        // deny as NoAccess
        let (status, message) = match (status, record.as_ref()) {
            (AccessStatus::Valid, _) => {
                info!(identity = %identity, "Login admitted with valid access");
                return GateOutcome::Admit;
            }
            (AccessStatus::Expired, Some(rec)) => {
                (AccessStatus::Expired, self.messages.expired(rec))
            }
            (AccessStatus::NotStarted, Some(rec)) => {
                (AccessStatus::NotStarted, self.messages.not_started(rec))
            }
            _ => (AccessStatus::NoAccess, self.messages.no_access()),
        };

        info!(identity = %identity, status = %status, "Login denied");
        GateOutcome::Deny { status, message }
    }
}

impl LoginGate for GateDecision {
    fn decide(&self, identity: &IdentityId) -> LoginDecision {
        match self.check(identity) {
            GateOutcome::Admit => LoginDecision::Admit,
            GateOutcome::Deny { message, .. } => LoginDecision::Deny { message },
        }
    }
}
