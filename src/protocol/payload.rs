//! Wire-safe payload shapes and the base64 codec.
//!
//! Rich domain objects (raw byte messages, decoded accounts) do not
//! survive the JSON envelope directly, so every payload crossing the
//! connection is reduced to primitive shapes here: bytes become base64
//! strings, accounts become [`WireAccount`]. The inverse decoding lives
//! on the domain types in [`crate::wallet`].

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wallet::WalletAccount;

// ============================================================================
// WireAccount
// ============================================================================

/// Wire-safe form of an authenticated account descriptor.
///
/// The public key travels base64-encoded; chain and feature identifiers
/// stay as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccount {
    /// Account address.
    pub address: String,

    /// Base64-encoded public key bytes.
    pub public_key: String,

    /// Chain identifiers this account operates on.
    pub chains: Vec<String>,

    /// Feature identifiers this account supports.
    pub features: Vec<String>,

    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Optional icon data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl From<&WalletAccount> for WireAccount {
    fn from(account: &WalletAccount) -> Self {
        Self {
            address: account.address.clone(),
            public_key: Base64Standard.encode(&account.public_key),
            chains: account.chains.clone(),
            features: account.features.clone(),
            label: account.label.clone(),
            icon: account.icon.clone(),
        }
    }
}

// ============================================================================
// Sign Message
// ============================================================================

/// Params for `signPersonalMessage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessagePayload {
    /// Base64-encoded message bytes.
    pub message: String,

    /// The account that should sign.
    pub account: WireAccount,
}

impl SignMessagePayload {
    /// Encodes a raw message for the given account.
    #[must_use]
    pub fn new(message: &[u8], account: &WalletAccount) -> Self {
        Self {
            message: Base64Standard.encode(message),
            account: account.into(),
        }
    }
}

/// Output of `signPersonalMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignPersonalMessageOutput {
    /// Base64-encoded signed message bytes.
    pub bytes: String,

    /// Signature over the message.
    pub signature: String,
}

/// Output of the legacy `signMessage` operation.
///
/// Same data as [`SignPersonalMessageOutput`] under the older field name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageOutput {
    /// Base64-encoded signed message bytes.
    pub message_bytes: String,

    /// Signature over the message.
    pub signature: String,
}

impl From<SignPersonalMessageOutput> for SignMessageOutput {
    fn from(output: SignPersonalMessageOutput) -> Self {
        Self {
            message_bytes: output.bytes,
            signature: output.signature,
        }
    }
}

// ============================================================================
// Sign Transaction
// ============================================================================

/// Params for `signTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionPayload {
    /// Serialized transaction block.
    pub transaction_block: String,

    /// The account that should sign.
    pub account: WireAccount,

    /// Chain the transaction targets.
    pub chain: String,
}

impl SignTransactionPayload {
    /// Builds the wire payload for a serialized transaction block.
    #[must_use]
    pub fn new(transaction_block: &str, account: &WalletAccount, chain: &str) -> Self {
        Self {
            transaction_block: transaction_block.to_string(),
            account: account.into(),
            chain: chain.to_string(),
        }
    }
}

/// Output of `signTransaction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionOutput {
    /// Base64-encoded signed transaction block bytes.
    pub transaction_block_bytes: String,

    /// Signature over the transaction block.
    pub signature: String,
}

// ============================================================================
// Sign And Execute
// ============================================================================

/// Execution directives for `signAndExecuteTransaction`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    /// Execution request type understood by the agent's node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,

    /// Response content options forwarded to the agent's node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Params for `signAndExecuteTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignAndExecutePayload {
    /// Serialized transaction block.
    pub transaction_block: String,

    /// The account that should sign.
    pub account: WireAccount,

    /// Chain the transaction targets.
    pub chain: String,

    /// Execution directives.
    #[serde(flatten)]
    pub execution: ExecutionOptions,
}

impl SignAndExecutePayload {
    /// Builds the wire payload for signing and executing a transaction.
    #[must_use]
    pub fn new(
        transaction_block: &str,
        account: &WalletAccount,
        chain: &str,
        execution: ExecutionOptions,
    ) -> Self {
        Self {
            transaction_block: transaction_block.to_string(),
            account: account.into(),
            chain: chain.to_string(),
            execution,
        }
    }
}

/// Output of `signAndExecuteTransaction`.
///
/// The digest identifies the executed transaction; whatever extra
/// content the agent's node returned (effects, events) is kept verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteTransactionOutput {
    /// Digest of the executed transaction.
    pub digest: String,

    /// Remaining response content, shape depends on requested options.
    #[serde(flatten)]
    pub extra: Value,
}

// ============================================================================
// Tests
// ============================================================================
