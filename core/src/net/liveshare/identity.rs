//! Subclient identity derivation
//!
//! Pure functions of the session and the configuration. The host always
//! gets the configured host id and the first palette color. Any other role
//! is identified by its peer number and colored by `palette[peer - 1]`.

use glsp_collab_shared::SubclientInfo;

use super::types::{Role, Session};
use crate::config::CollaborationConfig;

/// Subclient id for the given session.
pub fn subclient_id(session: &Session, config: &CollaborationConfig) -> String {
    match session.role {
        Role::Host => config.host_subclient_id.clone(),
        Role::Guest | Role::None => session.peer_number.to_string(),
    }
}

/// Palette color for the given session.
pub fn subclient_color(session: &Session, config: &CollaborationConfig) -> String {
    let index = match session.role {
        Role::Host => Some(0),
        // Peer numbers start at 1; 0 has no slot
        Role::Guest | Role::None => (session.peer_number as usize).checked_sub(1),
    };
    index
        .and_then(|i| config.palette.get(i))
        .cloned()
        .unwrap_or_else(|| config.fallback_color.clone())
}

/// Display name: e-mail address when known, else the display name.
pub fn subclient_name(session: &Session) -> String {
    session
        .user
        .as_ref()
        .map(|user| match &user.email_address {
            Some(email) if !email.is_empty() => email.clone(),
            _ => user.display_name.clone(),
        })
        .unwrap_or_default()
}

/// Full identity record for the given session.
pub fn derive_subclient_info(session: &Session, config: &CollaborationConfig) -> SubclientInfo {
    SubclientInfo {
        subclient_id: subclient_id(session, config),
        name: subclient_name(session),
        color: subclient_color(session, config),
    }
}
