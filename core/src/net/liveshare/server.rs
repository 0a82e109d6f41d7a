//! Local diagram-server handle the relay forwards into
//!
//! On the host, guest requests end up on the [`GlspClient`]. On a guest,
//! notifications addressed to it are handed to [`GlspServer::fire_server_send`],
//! the same sink the local server's own messages flow through.

use std::sync::Arc;

use async_trait::async_trait;
use glsp_collab_shared::{
    ActionMessage, DisposeClientSessionParameters, InitializeClientSessionParameters,
};

/// Protocol client talking to the diagram server
#[async_trait]
pub trait GlspClient: Send + Sync {
    async fn initialize_client_session(
        &self,
        params: InitializeClientSessionParameters,
    ) -> anyhow::Result<()>;

    async fn dispose_client_session(
        &self,
        params: DisposeClientSessionParameters,
    ) -> anyhow::Result<()>;

    /// Fire-and-forget delivery of an action to the server
    fn send_action_message(&self, message: ActionMessage);
}

/// Integration-side view of the diagram server
#[async_trait]
pub trait GlspServer: Send + Sync {
    /// Resolves once the protocol client has started
    async fn glsp_client(&self) -> Arc<dyn GlspClient>;

    /// Emit a server-originated message to the local editors
    fn fire_server_send(&self, message: ActionMessage);
}
