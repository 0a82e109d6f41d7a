//! Collaboration transport capability
//!
//! The relay does not implement session discovery, service registration or
//! message delivery. It consumes them through these traits. A real
//! deployment plugs in its collaboration SDK; [`super::loopback`] provides an
//! in-process implementation.
//!
//! Handlers are plain closures returning boxed futures so any transport can
//! store and invoke them without knowing about the relay.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use super::types::{SessionChangeEvent, TransportError};

/// Invoked for every session change, in delivery order
pub type SessionChangeListener =
    Arc<dyn Fn(SessionChangeEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Host-side handler for one request kind. Receives the positional argument list.
pub type RequestHandler =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, TransportError>> + Send + Sync>;

/// Guest-side handler for one notification kind
pub type NotifyHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Entry point of a collaboration transport
#[async_trait]
pub trait CollaborationApi: Send + Sync {
    /// Subscribe to session changes for the lifetime of the transport
    fn on_did_change_session(&self, listener: SessionChangeListener);

    /// Host: publish a named service. `None` if sharing is refused.
    async fn share_service(&self, name: &str) -> Option<Arc<dyn SharedService>>;

    /// Guest: attach to a service the host published. `None` if not found.
    async fn get_shared_service(&self, name: &str) -> Option<Arc<dyn SharedServiceProxy>>;
}

/// Host-side handle to a published service
pub trait SharedService: Send + Sync {
    fn is_service_available(&self) -> bool;

    /// Register (or replace) the handler for a request kind
    fn on_request(&self, name: &str, handler: RequestHandler);

    /// Broadcast a notification to every attached guest
    fn notify(&self, name: &str, payload: Value);
}

/// Guest-side proxy to the host's service
#[async_trait]
pub trait SharedServiceProxy: Send + Sync {
    fn is_service_available(&self) -> bool;

    /// Register a handler for a notification kind
    fn on_notify(&self, name: &str, handler: NotifyHandler);

    /// Send a request to the host and wait for its response
    async fn request(&self, name: &str, args: Vec<Value>) -> Result<Value, TransportError>;
}
