//! Command definitions for the remote agent protocol.
//!
//! Each command serializes to a `method` string plus a `params` object.
//!
//! # Recognized Methods
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `requestConnectionKey` | Ask the agent to issue a fresh pairing key |
//! | `authenticate` | Wait for the paired device to approve the key |
//! | `signPersonalMessage` | Sign an arbitrary byte message |
//! | `signTransaction` | Sign a serialized transaction block |
//! | `signAndExecuteTransaction` | Sign and submit a transaction block |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use super::payload::{SignAndExecutePayload, SignMessagePayload, SignTransactionPayload};

// ============================================================================
// Command
// ============================================================================

/// All protocol commands, tagged by method name.
///
/// Serializes as `{ "method": "...", "params": { ... } }`; the request
/// envelope flattens this next to the correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Command {
    /// Request a fresh pairing key from the remote agent.
    ///
    /// The key is short-lived and bound to this connection; a new
    /// connection always requires a new key.
    #[serde(rename = "requestConnectionKey")]
    RequestConnectionKey {},

    /// Wait for the paired device to authenticate the given key.
    ///
    /// Resolves with the authenticated account set once the user
    /// approves on the companion device.
    #[serde(rename = "authenticate")]
    Authenticate {
        /// The pairing key previously issued by the agent.
        key: String,
    },

    /// Sign an arbitrary personal message.
    #[serde(rename = "signPersonalMessage")]
    SignPersonalMessage(SignMessagePayload),

    /// Sign a serialized transaction block.
    #[serde(rename = "signTransaction")]
    SignTransaction(SignTransactionPayload),

    /// Sign a transaction block and submit it for execution.
    #[serde(rename = "signAndExecuteTransaction")]
    SignAndExecuteTransaction(SignAndExecutePayload),
}

impl Command {
    /// Returns the wire method name for this command.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::RequestConnectionKey {} => "requestConnectionKey",
            Self::Authenticate { .. } => "authenticate",
            Self::SignPersonalMessage(_) => "signPersonalMessage",
            Self::SignTransaction(_) => "signTransaction",
            Self::SignAndExecuteTransaction(_) => "signAndExecuteTransaction",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_connection_key_serialization() {
        let json = serde_json::to_value(Command::RequestConnectionKey {}).expect("serialize");
        assert_eq!(json["method"], "requestConnectionKey");
        assert!(json["params"].as_object().expect("params object").is_empty());
    }

    #[test]
    fn test_authenticate_serialization() {
        let command = Command::Authenticate {
            key: "abc123".to_string(),
        };
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["method"], "authenticate");
        assert_eq!(json["params"]["key"], "abc123");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(
            Command::RequestConnectionKey {}.method(),
            "requestConnectionKey"
        );
        assert_eq!(
            Command::Authenticate { key: String::new() }.method(),
            "authenticate"
        );
    }
}
