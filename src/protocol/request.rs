//! Request and Response envelope types.
//!
//! Defines the serialized unit exchanged over the duplex connection.
//! A response echoes the correlation id of its originating request;
//! matching is by id only, never by arrival order.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A request envelope from the host to the remote agent.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "signPersonalMessage",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request with auto-generated correlation id.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            command,
        }
    }

    /// Creates a new request with a specific correlation id.
    #[inline]
    #[must_use]
    pub const fn with_id(id: RequestId, command: Command) -> Self {
        Self { id, command }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response envelope from the remote agent.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": "uuid", "result": ... }
/// ```
///
/// Error:
/// ```json
/// { "id": "uuid", "error": { "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the originating request `id`.
    pub id: RequestId,

    /// Result payload (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if the agent rejected the request).
    #[serde(default)]
    pub error: Option<RemoteErrorPayload>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, mapping an error payload to
    /// [`Error::Remote`].
    ///
    /// A success response with no `result` field yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] if the agent returned an error payload.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(payload) => Err(Error::remote(payload.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// RemoteErrorPayload
// ============================================================================

/// Error payload carried in a rejecting response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteErrorPayload {
    /// Human-readable rejection message from the agent.
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::payload::SignMessagePayload;
    use crate::wallet::WalletAccount;

    fn sample_account() -> WalletAccount {
        WalletAccount {
            address: "0xabc".to_string(),
            public_key: vec![1, 2, 3],
            chains: vec!["sui:testnet".to_string()],
            features: vec![],
            label: None,
            icon: None,
        }
    }

    #[test]
    fn test_request_serialization_flattens_command() {
        let request = Request::new(Command::Authenticate {
            key: "abc123".to_string(),
        });
        let json = serde_json::to_value(&request).expect("serialize");

        assert!(json["id"].is_string());
        assert_eq!(json["method"], "authenticate");
        assert_eq!(json["params"]["key"], "abc123");
    }

    #[test]
    fn test_request_with_id() {
        let id = RequestId::generate();
        let request = Request::with_id(id, Command::RequestConnectionKey {});
        assert_eq!(request.id, id);
    }

    #[test]
    fn test_sign_request_carries_payload() {
        let payload = SignMessagePayload::new(b"hello", &sample_account());
        let request = Request::new(Command::SignPersonalMessage(payload));
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["method"], "signPersonalMessage");
        assert_eq!(json["params"]["message"], "aGVsbG8=");
        assert_eq!(json["params"]["account"]["address"], "0xabc");
    }

    #[test]
    fn test_success_response() {
        let json_str = format!(
            r#"{{ "id": "{}", "result": "the-key" }}"#,
            RequestId::generate()
        );
        let response: Response = serde_json::from_str(&json_str).expect("parse");

        assert!(!response.is_error());
        let value = response.into_result().expect("success");
        assert_eq!(value, "the-key");
    }

    #[test]
    fn test_error_response() {
        let json_str = format!(
            r#"{{ "id": "{}", "error": {{ "message": "user declined" }} }}"#,
            RequestId::generate()
        );
        let response: Response = serde_json::from_str(&json_str).expect("parse");

        assert!(response.is_error());
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Remote agent error: user declined");
    }

    #[test]
    fn test_result_defaults_to_null() {
        let json_str = format!(r#"{{ "id": "{}" }}"#, RequestId::generate());
        let response: Response = serde_json::from_str(&json_str).expect("parse");
        assert_eq!(response.into_result().expect("success"), Value::Null);
    }
}
