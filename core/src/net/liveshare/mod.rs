//! GLSP collaboration relay over a shared-session transport
//!
//! Bridges a local diagram server to a real-time collaboration session. The
//! transport (session discovery, service sharing, request and notify
//! delivery) is consumed through [`transport`]; this module only decides
//! what to forward where.
//!
//! # Message Flow
//!
//! ```text
//! Guest                                   Host
//!   |                                       |
//!   |--- INITIALIZE_CLIENT_SESSION [p] ---->|  -> GlspClient::initialize_client_session
//!   |--- DISPOSE_CLIENT_SESSION [p] ------->|  -> GlspClient::dispose_client_session
//!   |--- SEND_ACTION_MESSAGE [m] ---------->|  -> GlspClient::send_action_message
//!   |                                       |
//!   |<-- ON_ACTION_MESSAGE m ---------------|  (broadcast; guest keeps it only if
//!   |                                       |   m.action.subclientId is its own)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use glsp_collab_core::net::liveshare::SessionRelay;
//!
//! let relay = SessionRelay::new(glsp_collab_core::config::load());
//! relay.initialize(transport, server)?;
//!
//! // Guest
//! relay.initialize_client_session(params).await?;
//!
//! // Host
//! relay.handle_action_message(message)?;
//! ```

pub mod guest;
pub mod host;
pub mod identity;
pub mod loopback;
pub mod relay;
pub mod server;
pub mod session;
pub mod snapshot;
pub mod transport;
pub mod types;

#[cfg(test)]
mod tests;

pub use guest::{GuestRelay, deliver_if_addressed};
pub use host::HostRelay;
pub use identity::derive_subclient_info;
pub use loopback::{LoopbackHub, LoopbackPeer, LoopbackProxy, LoopbackService};
pub use relay::CollaborationRelay;
pub use server::{GlspClient, GlspServer};
pub use session::SessionRelay;
pub use snapshot::RelaySnapshot;
pub use transport::{
    CollaborationApi, NotifyHandler, RequestHandler, SessionChangeListener, SharedService,
    SharedServiceProxy,
};
pub use types::{RelayError, Role, Session, SessionChangeEvent, SessionUser, TransportError};
