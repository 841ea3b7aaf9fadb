//! Error types for the wallet bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use mate_wallet_bridge::{Result, WalletClient};
//!
//! async fn example(client: &WalletClient) -> Result<()> {
//!     let accounts = client.connect().await?;
//!     println!("paired with {} accounts", accounts.len());
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | State | [`Error::AlreadyConnecting`], [`Error::NotConnected`] |
//! | Connection | [`Error::Transport`], [`Error::ConnectionClosed`] |
//! | Timing | [`Error::Timeout`] |
//! | Pairing | [`Error::Presentation`] |
//! | Remote | [`Error::Remote`] |
//! | Codec | [`Error::Payload`] |
//! | External | [`Error::Config`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context so a host can distinguish
/// "wrong state" from "timed out" from "remote rejected" from
/// "connection dropped" and react accordingly.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // State Errors
    // ========================================================================
    /// A pairing handshake is already in progress.
    ///
    /// Returned when `connect()` is called re-entrantly. The in-flight
    /// handshake is unaffected.
    #[error("Connection attempt already in progress")]
    AlreadyConnecting,

    /// Operation requires an established connection.
    ///
    /// Returned when a signing operation is issued while disconnected.
    #[error("Not connected to remote agent")]
    NotConnected,

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection establishment failed.
    ///
    /// Returned when the WebSocket connection or handshake to the remote
    /// agent endpoint cannot be set up.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// Connection closed while operations were outstanding.
    ///
    /// Every pending request is failed with this error when the
    /// connection drops, remote-initiated or manual.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Timing Errors
    // ========================================================================
    /// Per-operation deadline exceeded.
    ///
    /// Carries the phase that timed out so a host can distinguish a slow
    /// signing device from an abandoned pairing scan.
    #[error("Timed out after {timeout_ms}ms during {phase}")]
    Timeout {
        /// Which operation phase exceeded its deadline.
        phase: &'static str,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Pairing Errors
    // ========================================================================
    /// The pairing key could not be shown to the user.
    ///
    /// Returned when the presentation collaborator fails (for example a
    /// blocked pop-up window).
    #[error("Pairing key presentation failed: {message}")]
    Presentation {
        /// Description of the presentation failure.
        message: String,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The remote agent returned an explicit error payload.
    #[error("Remote agent error: {message}")]
    Remote {
        /// Error message from the remote agent.
        message: String,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// A wire payload could not be decoded into its domain form.
    ///
    /// Returned when a result envelope carries a payload that fails
    /// base64 or shape validation.
    #[error("Invalid payload: {message}")]
    Payload {
        /// Description of the payload defect.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Bridge configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a timeout error for the given phase.
    #[inline]
    pub const fn timeout(phase: &'static str, timeout_ms: u64) -> Self {
        Self::Timeout { phase, timeout_ms }
    }

    /// Creates a presentation error.
    #[inline]
    pub fn presentation(message: impl Into<String>) -> Self {
        Self::Presentation {
            message: message.into(),
        }
    }

    /// Creates a remote agent error.
    #[inline]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Creates a payload codec error.
    #[inline]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ConnectionClosed)
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry; a host UI can offer a
    /// retry for these and abandon otherwise.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("refused");
        assert_eq!(err.to_string(), "Transport failure: refused");
    }

    #[test]
    fn test_timeout_carries_phase() {
        let err = Error::timeout("authenticate", 300_000);
        assert_eq!(
            err.to_string(),
            "Timed out after 300000ms during authenticate"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::transport("x").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::AlreadyConnecting.is_connection_error());
        assert!(!Error::remote("rejected").is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::timeout("signing", 30_000).is_recoverable());
        assert!(Error::ConnectionClosed.is_recoverable());
        assert!(!Error::config("bad endpoint").is_recoverable());
        assert!(!Error::remote("user declined").is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_state_errors_distinguishable() {
        assert_ne!(
            Error::AlreadyConnecting.to_string(),
            Error::NotConnected.to_string()
        );
    }
}
