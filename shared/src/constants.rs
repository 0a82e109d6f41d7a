//! Centralized constants for the GLSP collaboration channel.
//!
//! Every peer implementation must agree on these values; they are part of
//! the wire contract between a host and its guests.

/// Name of the shared service published by the host.
pub const SERVICE_NAME: &str = "GLSP-LIVESHARE-SERVICE";

/// Request (guest -> host): open a client session on the host's server.
pub const INITIALIZE_CLIENT_SESSION: &str = "INITIALIZE_CLIENT_SESSION";

/// Request (guest -> host): dispose a client session on the host's server.
pub const DISPOSE_CLIENT_SESSION: &str = "DISPOSE_CLIENT_SESSION";

/// Request (guest -> host): forward an action message to the host's client.
pub const SEND_ACTION_MESSAGE: &str = "SEND_ACTION_MESSAGE";

/// Notify (host -> guests): an action message produced by the host's server.
pub const ON_ACTION_MESSAGE: &str = "ON_ACTION_MESSAGE";

/// Subclient identifier always assigned to the host, whatever its peer number.
pub const SUBCLIENT_HOST_ID: &str = "H";

/// Participant colors. The host takes index 0, guest `n` takes index `n - 1`.
pub const COLORS: [&str; 4] = ["#5C2D91", "#FFF100", "#E3008C", "#FF8C00"];

/// Color used when a guest's peer number falls outside [`COLORS`].
pub const FALLBACK_COLOR: &str = "#FFFFFF";
