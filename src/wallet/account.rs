//! Authenticated account descriptors.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;

use crate::error::{Error, Result};
use crate::protocol::WireAccount;

// ============================================================================
// WalletAccount
// ============================================================================

/// An account the companion device authenticated for this session.
///
/// Decoded from its wire form after the pairing handshake; exposed to
/// callers as immutable snapshots, never as live references into the
/// session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    /// Account address.
    pub address: String,

    /// Raw public key bytes.
    pub public_key: Vec<u8>,

    /// Chain identifiers this account operates on.
    pub chains: Vec<String>,

    /// Feature identifiers this account supports.
    pub features: Vec<String>,

    /// Optional human-readable label.
    pub label: Option<String>,

    /// Optional icon data URI.
    pub icon: Option<String>,
}

impl WalletAccount {
    /// Decodes an account from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Payload`] if the public key is not valid base64.
    pub fn from_wire(wire: WireAccount) -> Result<Self> {
        let public_key = Base64Standard.decode(&wire.public_key).map_err(|e| {
            Error::payload(format!(
                "account {} has invalid public key encoding: {e}",
                wire.address
            ))
        })?;

        Ok(Self {
            address: wire.address,
            public_key,
            chains: wire.chains,
            features: wire.features,
            label: wire.label,
            icon: wire.icon,
        })
    }

    /// Encodes this account into its wire form.
    #[inline]
    #[must_use]
    pub fn to_wire(&self) -> WireAccount {
        self.into()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_account() -> WireAccount {
        WireAccount {
            address: "0xabc".to_string(),
            public_key: "AQID".to_string(),
            chains: vec!["sui:devnet".to_string()],
            features: vec!["wallet:signTransaction".to_string()],
            label: Some("test".to_string()),
            icon: None,
        }
    }

    #[test]
    fn test_from_wire_decodes_public_key() {
        let account = WalletAccount::from_wire(wire_account()).expect("decode");
        assert_eq!(account.public_key, vec![1, 2, 3]);
        assert_eq!(account.address, "0xabc");
        assert_eq!(account.label.as_deref(), Some("test"));
    }

    #[test]
    fn test_from_wire_rejects_invalid_base64() {
        let mut wire = wire_account();
        wire.public_key = "not base64!!!".to_string();
        let err = WalletAccount::from_wire(wire).unwrap_err();
        assert!(matches!(err, Error::Payload { .. }));
    }

    #[test]
    fn test_wire_roundtrip() {
        let account = WalletAccount::from_wire(wire_account()).expect("decode");
        assert_eq!(account.to_wire(), wire_account());
    }
}
