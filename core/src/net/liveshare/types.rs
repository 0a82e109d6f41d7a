//! Core types for collaboration sessions

use thiserror::Error;

/// Role of the local peer in the current collaboration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// No session, or the session ended
    #[default]
    None,
    Host,
    Guest,
}

/// User attached to a session by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub display_name: String,
    pub email_address: Option<String>,
}

/// Session as reported by the transport. The relay only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    /// Transport-assigned peer number (the host is usually 0)
    pub peer_number: u32,
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn host(peer_number: u32) -> Self {
        Self {
            role: Role::Host,
            peer_number,
            user: None,
        }
    }

    pub fn guest(peer_number: u32) -> Self {
        Self {
            role: Role::Guest,
            peer_number,
            user: None,
        }
    }

    pub fn ended() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }
}

/// Delivered by the transport whenever the local session changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChangeEvent {
    pub session: Session,
}

/// Failures reported by a transport or by a request handler running on it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("no handler registered for '{0}'")]
    NoHandler(String),
    #[error("shared service '{0}' is not available")]
    Unavailable(String),
    #[error("could not decode request: {0}")]
    Decode(String),
    #[error("request handler failed: {0}")]
    Handler(String),
}

/// Collaboration relay errors
#[derive(Error, Debug)]
pub enum RelayError {
    /// The collaboration transport is not installed or not enabled
    #[error("collaboration transport is not available")]
    NoTransport,
    #[error("relay is already initialized")]
    AlreadyInitialized,
    /// No session has been established yet, or it ended
    #[error("no active collaboration session")]
    NoSession,
    /// Publishing or looking up the shared service returned nothing
    #[error("shared service is unavailable")]
    ServiceUnavailable,
    #[error("operation is only valid on the host")]
    NotHost,
    #[error("operation is only valid on a guest")]
    NotGuest,
    /// A notification addressed to another subclient reached this guest
    #[error("message addressed to '{actual}', local subclient is '{expected}'")]
    DeliveryMismatch { expected: String, actual: String },
    #[error("could not encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The local protocol client failed
    #[error("protocol client error: {0}")]
    Client(anyhow::Error),
}
