//! Immutable view of the relay state
//!
//! Role, session, identity and relay are replaced together on every session
//! change, so a reader never observes a half-applied transition.

use std::fmt;
use std::sync::Arc;

use glsp_collab_shared::SubclientInfo;

use super::relay::CollaborationRelay;
use super::types::{Role, Session};

#[derive(Clone, Default)]
pub struct RelaySnapshot {
    /// Incremented once per session change
    epoch: u64,
    role: Role,
    session: Option<Session>,
    identity: Option<SubclientInfo>,
    relay: Option<Arc<dyn CollaborationRelay>>,
}

impl RelaySnapshot {
    pub fn new(
        epoch: u64,
        session: Session,
        identity: SubclientInfo,
        relay: Option<Arc<dyn CollaborationRelay>>,
    ) -> Self {
        Self {
            epoch,
            role: session.role,
            session: Some(session),
            identity: Some(identity),
            relay,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn relay(&self) -> Option<&Arc<dyn CollaborationRelay>> {
        self.relay.as_ref()
    }

    /// Derived subclient id, or `""` before the first session change
    pub fn subclient_id(&self) -> &str {
        self.identity
            .as_ref()
            .map(|info| info.subclient_id.as_str())
            .unwrap_or_default()
    }

    /// Derived identity, or an empty record before the first session change
    pub fn subclient_info(&self) -> SubclientInfo {
        self.identity.clone().unwrap_or_default()
    }

    pub fn is_in_collaborate_mode(&self) -> bool {
        self.relay
            .as_ref()
            .is_some_and(|relay| relay.is_service_available())
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest
    }
}

impl fmt::Debug for RelaySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySnapshot")
            .field("epoch", &self.epoch)
            .field("role", &self.role)
            .field("session", &self.session)
            .field("identity", &self.identity)
            .field("relay", &self.relay.as_ref().map(|r| r.role()))
            .finish()
    }
}
