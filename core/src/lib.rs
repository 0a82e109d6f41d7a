//! Collaboration core for GLSP diagram editors
//!
//! Relays diagram-protocol traffic between the host of a shared editing
//! session and its guests. See [`net::liveshare`].

pub mod config;
pub mod net;

pub use config::CollaborationConfig;
