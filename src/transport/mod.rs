//! WebSocket transport layer.
//!
//! Turns the unreliable duplex byte stream to the remote agent into a
//! set of well-defined, independently-timed, independently-failable
//! request/response exchanges.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                          ┌──────────────────┐
//! │  Host (Rust)     │                          │  Remote Agent    │
//! │                  │        WebSocket         │  (paired mobile  │
//! │  Connection      │◄────────────────────────►│   device)        │
//! │  + Correlation   │      one endpoint        │                  │
//! └──────────────────┘                          └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - dial the configured endpoint
//! 2. Pairing handshake runs over the fresh connection
//! 3. Requests and responses correlate by id, each with its own deadline
//! 4. On close (remote or manual) every pending request fails
//! 5. Unexpected closes feed `ReconnectState` backoff scheduling
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Connection event loop and dispatch |
//! | `correlation` | Pending-request table |
//! | `reconnect` | Backoff state for automatic reconnection |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Correlation table for outstanding requests.
pub mod correlation;

/// Reconnection backoff state.
pub mod reconnect;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{CloseReason, Connection};
pub use correlation::CorrelationTable;
pub use reconnect::{ReconnectPhase, ReconnectState};
