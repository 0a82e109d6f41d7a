//! Shared types for the GLSP collaboration channel.
//!
//! Used by both ends of a collaboration session: the host that owns the
//! diagram server and the guests that talk to it through the shared service.

pub mod channel;
pub mod constants;
pub mod protocol;

pub use channel::{RequestArgsError, unwrap_request_args, wrap_request_args};
pub use constants::*;
pub use protocol::{
    Action, ActionMessage, DisposeClientSessionParameters, InitializeClientSessionParameters,
    SubclientInfo,
};
