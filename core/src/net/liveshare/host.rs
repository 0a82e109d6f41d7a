//! Host side of the relay
//!
//! Publishes the shared service and forwards the three guest request kinds
//! to the local protocol client. Outgoing server messages are broadcast as
//! notifications; each guest filters for its own subclient id.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use glsp_collab_shared::{
    ActionMessage, DISPOSE_CLIENT_SESSION, DisposeClientSessionParameters,
    INITIALIZE_CLIENT_SESSION, InitializeClientSessionParameters, ON_ACTION_MESSAGE,
    SEND_ACTION_MESSAGE, unwrap_request_args,
};

use super::relay::CollaborationRelay;
use super::server::GlspServer;
use super::transport::{CollaborationApi, RequestHandler, SharedService};
use super::types::{RelayError, Role, TransportError};

/// Relay for the peer that owns the diagram server
pub struct HostRelay {
    service: Arc<dyn SharedService>,
}

impl HostRelay {
    /// Publish `service_name` and register the request handlers
    pub async fn publish(
        api: &dyn CollaborationApi,
        service_name: &str,
        server: Arc<dyn GlspServer>,
    ) -> Result<Self, RelayError> {
        let service = api
            .share_service(service_name)
            .await
            .ok_or(RelayError::ServiceUnavailable)?;

        register_handlers(service.as_ref(), server);
        tracing::info!("Published shared service '{}'", service_name);

        Ok(Self { service })
    }
}

#[async_trait]
impl CollaborationRelay for HostRelay {
    fn role(&self) -> Role {
        Role::Host
    }

    fn is_service_available(&self) -> bool {
        self.service.is_service_available()
    }

    async fn initialize_client_session(
        &self,
        _params: InitializeClientSessionParameters,
    ) -> Result<(), RelayError> {
        Err(RelayError::NotGuest)
    }

    async fn dispose_client_session(
        &self,
        _params: DisposeClientSessionParameters,
    ) -> Result<(), RelayError> {
        Err(RelayError::NotGuest)
    }

    async fn send_action_message(&self, _message: ActionMessage) -> Result<(), RelayError> {
        Err(RelayError::NotGuest)
    }

    fn handle_action_message(&self, message: ActionMessage) -> Result<(), RelayError> {
        let payload = serde_json::to_value(&message)?;
        self.service.notify(ON_ACTION_MESSAGE, payload);
        Ok(())
    }
}

fn register_handlers(service: &dyn SharedService, server: Arc<dyn GlspServer>) {
    let srv = server.clone();
    service.on_request(
        INITIALIZE_CLIENT_SESSION,
        request_handler(move |args| {
            let server = srv.clone();
            async move {
                let params: InitializeClientSessionParameters =
                    decode(INITIALIZE_CLIENT_SESSION, args)?;
                tracing::debug!("Guest opened client session {}", params.client_session_id);
                let client = server.glsp_client().await;
                client
                    .initialize_client_session(params)
                    .await
                    .map_err(|e| TransportError::Handler(format!("{e:#}")))?;
                Ok::<_, TransportError>(Value::Null)
            }
        }),
    );

    let srv = server.clone();
    service.on_request(
        DISPOSE_CLIENT_SESSION,
        request_handler(move |args| {
            let server = srv.clone();
            async move {
                let params: DisposeClientSessionParameters = decode(DISPOSE_CLIENT_SESSION, args)?;
                tracing::debug!("Guest disposed client session {}", params.client_session_id);
                let client = server.glsp_client().await;
                client
                    .dispose_client_session(params)
                    .await
                    .map_err(|e| TransportError::Handler(format!("{e:#}")))?;
                Ok::<_, TransportError>(Value::Null)
            }
        }),
    );

    service.on_request(
        SEND_ACTION_MESSAGE,
        request_handler(move |args| {
            let server = server.clone();
            async move {
                let message: ActionMessage = decode(SEND_ACTION_MESSAGE, args)?;
                let client = server.glsp_client().await;
                client.send_action_message(message);
                Ok::<_, TransportError>(Value::Null)
            }
        }),
    );
}

fn request_handler<F, Fut>(handler: F) -> RequestHandler
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TransportError>> + Send + 'static,
{
    Arc::new(move |args: Vec<Value>| handler(args).boxed())
}

fn decode<T: DeserializeOwned>(kind: &str, args: Vec<Value>) -> Result<T, TransportError> {
    unwrap_request_args(args).map_err(|e| TransportError::Decode(format!("{kind}: {e}")))
}
