//! Request argument framing for the collaboration channel.
//!
//! Requests travel as a positional list holding exactly one parameter
//! object: `[params]`. Transports may prepend their own entries (caller
//! descriptors and the like), so the receiving side reads the *last* entry.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestArgsError {
    #[error("request carried no arguments")]
    Empty,
    #[error("malformed request parameter: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Wrap a typed parameter as the one-element positional list sent on the wire.
pub fn wrap_request_args<T: Serialize>(param: &T) -> Result<Vec<Value>, serde_json::Error> {
    Ok(vec![serde_json::to_value(param)?])
}

/// Extract the typed parameter from a received positional list.
pub fn unwrap_request_args<T: DeserializeOwned>(mut args: Vec<Value>) -> Result<T, RequestArgsError> {
    let param = args.pop().ok_or(RequestArgsError::Empty)?;
    Ok(serde_json::from_value(param)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DisposeClientSessionParameters;
    use serde_json::json;

    #[test]
    fn wraps_as_single_element_list() {
        let args = wrap_request_args(&json!({ "clientSessionId": "s" })).unwrap();
        assert_eq!(args, vec![json!({ "clientSessionId": "s" })]);
    }

    #[test]
    fn unwrap_reads_last_entry() {
        let args = vec![json!({ "peer": 3 }), json!({ "clientSessionId": "s9" })];
        let params: DisposeClientSessionParameters = unwrap_request_args(args).unwrap();
        assert_eq!(params.client_session_id, "s9");
    }

    #[test]
    fn unwrap_rejects_empty_list() {
        let err = unwrap_request_args::<DisposeClientSessionParameters>(Vec::new()).unwrap_err();
        assert!(matches!(err, RequestArgsError::Empty));
    }

    #[test]
    fn unwrap_rejects_wrong_shape() {
        let err = unwrap_request_args::<DisposeClientSessionParameters>(vec![json!(42)]).unwrap_err();
        assert!(matches!(err, RequestArgsError::Malformed(_)));
    }
}
