//! Networking modules
//!
//! - [`liveshare`] - GLSP message relay over a shared collaboration session

pub mod liveshare;

pub use liveshare::{
    CollaborationApi, GlspClient, GlspServer, RelayError, RelaySnapshot, Role, Session,
    SessionRelay, TransportError,
};
