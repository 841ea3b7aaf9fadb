//! Mate Wallet Bridge - remote signing over one duplex connection.
//!
//! This library bridges a host application to a remote signing agent (a
//! paired mobile wallet) over a single persistent WebSocket connection,
//! exposing request/response semantics to a caller that only sees
//! asynchronous operations.
//!
//! # Architecture
//!
//! The bridge follows a client-agent model:
//!
//! - **Host (Rust)**: issues correlated requests, awaits typed outcomes
//! - **Remote agent**: authenticates via a scanned pairing key, signs on
//!   the companion device, answers by correlation id
//!
//! Key design principles:
//!
//! - One [`Connection`](transport::Connection) owns the socket, the
//!   correlation table, and the event loop
//! - Every registered request resolves through exactly one path:
//!   matching response, per-operation deadline, or connection-close sweep
//! - Unexpected closes feed a bounded linear-backoff reconnection
//!   supervisor; manual closes suppress it
//! - Pairing key presentation is a trait seam, never a concrete renderer
//!
//! # Quick Start
//!
//! ```no_run
//! use mate_wallet_bridge::{BridgeOptions, Result, WalletClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = WalletClient::new(
//!         BridgeOptions::new().with_endpoint("ws://localhost:3001"),
//!     );
//!
//!     // Runs the pairing handshake: key issuance, out-of-band display,
//!     // bounded wait for approval on the companion device.
//!     let accounts = client.connect().await?;
//!
//!     let output = client
//!         .sign_personal_message(b"hello", &accounts[0])
//!         .await?;
//!     println!("signature: {}", output.signature);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Correlation id newtype |
//! | [`options`] | Bridge configuration builder |
//! | [`presenter`] | Pairing key presentation seam |
//! | [`protocol`] | Wire envelopes, commands, payload codec |
//! | [`transport`] | Connection, correlation table, backoff state |
//! | [`wallet`] | Client facade, accounts, capability table |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// The correlation id newtype linking requests to responses.
pub mod identifiers;

/// Bridge configuration options.
///
/// Use [`BridgeOptions::new()`] and the `with_*` builder methods.
pub mod options;

/// Pairing key presentation.
///
/// Implement [`PairingPresenter`] to render the key for the user.
pub mod presenter;

/// Wire protocol message types.
///
/// Internal module defining envelope, command, and payload structures.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the connection, correlation, and backoff.
pub mod transport;

/// Wallet surface exposed to adapter hosts.
pub mod wallet;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Options
pub use options::{BridgeOptions, DEFAULT_ENDPOINT};

// Presenter types
pub use presenter::{PairingPresenter, TracingPresenter};

// Protocol payload types
pub use protocol::{
    ExecuteTransactionOutput, ExecutionOptions, SignMessageOutput, SignPersonalMessageOutput,
    SignTransactionOutput,
};

// Wallet types
pub use wallet::{CAPABILITIES, Capability, ConnectionState, WalletAccount, WalletClient};
