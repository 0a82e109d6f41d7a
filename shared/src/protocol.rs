//! GLSP protocol payloads carried over the collaboration channel.
//!
//! The relay treats these as opaque: the only field it ever reads is
//! [`Action::subclient_id`]. Everything else is kept in flattened maps so a
//! message decoded on one peer re-encodes byte-for-byte compatible on the
//! next.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An action addressed to (or produced by) a client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub client_id: String,
    pub action: Action,
}

/// Action payload. Only `kind` and `subclientId` are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub kind: String,
    /// Target subclient. Guests drop notifications not addressed to them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclient_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Action {
    /// Create an action with no payload beyond its kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subclient_id: None,
            extra: Map::new(),
        }
    }

    /// Address this action to a subclient.
    pub fn for_subclient(mut self, subclient_id: impl Into<String>) -> Self {
        self.subclient_id = Some(subclient_id.into());
        self
    }
}

impl ActionMessage {
    pub fn new(client_id: impl Into<String>, action: Action) -> Self {
        Self {
            client_id: client_id.into(),
            action,
        }
    }

    /// Subclient this message is addressed to, if any.
    pub fn target_subclient(&self) -> Option<&str> {
        self.action.subclient_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeClientSessionParameters {
    pub client_session_id: String,
    pub diagram_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposeClientSessionParameters {
    pub client_session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity of one participant inside a shared session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclientInfo {
    pub subclient_id: String,
    pub name: String,
    pub color: String,
}
