//! Mock host for testing

use async_trait::async_trait;
use std::sync::Mutex;
use timegate_util::IdentityId;

use crate::{HostError, HostResult, SessionHost};

/// Mock hosting environment for unit/integration testing.
///
/// Holds a mutable roster and records every disconnect it is asked to
/// perform instead of touching real connections.
#[derive(Default)]
pub struct MockHost {
    roster: Mutex<Vec<IdentityId>>,
    disconnects: Mutex<Vec<(IdentityId, String)>>,

    /// Configure disconnect to fail
    pub fail_disconnect: Mutex<bool>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, identity: IdentityId) {
        let mut roster = self.roster.lock().unwrap();
        if !roster.contains(&identity) {
            roster.push(identity);
        }
    }

    /// Disconnects performed so far, in order.
    pub fn disconnected(&self) -> Vec<(IdentityId, String)> {
        self.disconnects.lock().unwrap().clone()
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        *self.fail_disconnect.lock().unwrap() = fail;
    }
}

#[async_trait]
impl SessionHost for MockHost {
    fn connected_identities(&self) -> Vec<IdentityId> {
        self.roster.lock().unwrap().clone()
    }

    async fn disconnect(&self, identity: &IdentityId, message: &str) -> HostResult<()> {
        if *self.fail_disconnect.lock().unwrap() {
            return Err(HostError::DisconnectFailed("Mock disconnect failure".into()));
        }

        let mut roster = self.roster.lock().unwrap();
        roster.retain(|id| id != identity);

        self.disconnects
            .lock()
            .unwrap()
            .push((*identity, message.to_string()));
        Ok(())
    }
}
