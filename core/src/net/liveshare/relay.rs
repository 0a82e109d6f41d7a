//! Role-specific relay interface
//!
//! A transition to host or guest selects one implementation for the whole
//! session. Operations that belong to the other role fail with
//! [`RelayError::NotHost`] / [`RelayError::NotGuest`].

use async_trait::async_trait;
use glsp_collab_shared::{
    ActionMessage, DisposeClientSessionParameters, InitializeClientSessionParameters,
};

use super::types::{RelayError, Role};

#[async_trait]
pub trait CollaborationRelay: Send + Sync {
    fn role(&self) -> Role;

    /// Whether the transport still reports the underlying service as usable
    fn is_service_available(&self) -> bool;

    /// Guest: ask the host to open a client session
    async fn initialize_client_session(
        &self,
        params: InitializeClientSessionParameters,
    ) -> Result<(), RelayError>;

    /// Guest: ask the host to dispose a client session
    async fn dispose_client_session(
        &self,
        params: DisposeClientSessionParameters,
    ) -> Result<(), RelayError>;

    /// Guest: forward an action message to the host's protocol client
    async fn send_action_message(&self, message: ActionMessage) -> Result<(), RelayError>;

    /// Host: broadcast an action message to every guest
    fn handle_action_message(&self, message: ActionMessage) -> Result<(), RelayError>;
}
