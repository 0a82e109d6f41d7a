//! Guest side of the relay
//!
//! Talks to the host through a service proxy. Requests carry their parameter
//! as a one-element positional list. Host notifications are broadcast to every
//! guest, so each guest forwards only those addressed to its own subclient.

use std::sync::Arc;

use async_trait::async_trait;
use glsp_collab_shared::{
    ActionMessage, DISPOSE_CLIENT_SESSION, DisposeClientSessionParameters,
    INITIALIZE_CLIENT_SESSION, InitializeClientSessionParameters, ON_ACTION_MESSAGE,
    SEND_ACTION_MESSAGE, wrap_request_args,
};

use super::relay::CollaborationRelay;
use super::server::GlspServer;
use super::transport::{CollaborationApi, SharedServiceProxy};
use super::types::{RelayError, Role};

/// Relay for a peer joined to someone else's session
pub struct GuestRelay {
    proxy: Arc<dyn SharedServiceProxy>,
}

impl GuestRelay {
    /// Attach to the host's service and start listening for notifications.
    ///
    /// Every well-formed `ON_ACTION_MESSAGE` is handed to `on_message`, which
    /// decides whether it is still wanted. The transport keeps the callback
    /// for as long as it keeps the proxy, so it must not own the relay state.
    pub async fn attach<F>(
        api: &dyn CollaborationApi,
        service_name: &str,
        on_message: F,
    ) -> Result<Self, RelayError>
    where
        F: Fn(ActionMessage) + Send + Sync + 'static,
    {
        let proxy = api
            .get_shared_service(service_name)
            .await
            .ok_or(RelayError::ServiceUnavailable)?;

        proxy.on_notify(
            ON_ACTION_MESSAGE,
            Arc::new(move |payload: serde_json::Value| {
                match serde_json::from_value::<ActionMessage>(payload) {
                    Ok(message) => on_message(message),
                    Err(e) => tracing::warn!("Dropping malformed {}: {}", ON_ACTION_MESSAGE, e),
                }
            }),
        );
        tracing::info!("Attached to shared service '{}'", service_name);

        Ok(Self { proxy })
    }

    async fn request<T: serde::Serialize + Sync>(
        &self,
        kind: &str,
        param: &T,
    ) -> Result<(), RelayError> {
        let args = wrap_request_args(param)?;
        self.proxy.request(kind, args).await?;
        Ok(())
    }
}

/// Forward `message` to the local sink iff it targets `local_id`.
pub fn deliver_if_addressed(
    local_id: &str,
    message: ActionMessage,
    server: &dyn GlspServer,
) -> Result<(), RelayError> {
    match message.target_subclient() {
        Some(target) if target == local_id => {
            server.fire_server_send(message);
            Ok(())
        }
        other => Err(RelayError::DeliveryMismatch {
            expected: local_id.to_string(),
            actual: other.unwrap_or_default().to_string(),
        }),
    }
}

#[async_trait]
impl CollaborationRelay for GuestRelay {
    fn role(&self) -> Role {
        Role::Guest
    }

    fn is_service_available(&self) -> bool {
        self.proxy.is_service_available()
    }

    async fn initialize_client_session(
        &self,
        params: InitializeClientSessionParameters,
    ) -> Result<(), RelayError> {
        self.request(INITIALIZE_CLIENT_SESSION, &params).await
    }

    async fn dispose_client_session(
        &self,
        params: DisposeClientSessionParameters,
    ) -> Result<(), RelayError> {
        self.request(DISPOSE_CLIENT_SESSION, &params).await
    }

    async fn send_action_message(&self, message: ActionMessage) -> Result<(), RelayError> {
        self.request(SEND_ACTION_MESSAGE, &message).await
    }

    fn handle_action_message(&self, _message: ActionMessage) -> Result<(), RelayError> {
        Err(RelayError::NotHost)
    }
}
