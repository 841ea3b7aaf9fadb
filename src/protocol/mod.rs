//! Wire protocol for the remote agent connection.
//!
//! Every exchange over the duplex connection is a JSON envelope. Requests
//! carry `{ id, method, params }`; responses echo the `id` with either a
//! `result` or an `error` payload.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Method/params command definitions |
//! | `request` | Request/response envelope types |
//! | `payload` | Wire-safe payload shapes and codec |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions, one variant per recognized method.
pub mod command;

/// Request and response envelope types.
pub mod request;

/// Wire-safe payload shapes and the base64 codec.
pub mod payload;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::Command;
pub use payload::{
    ExecuteTransactionOutput, ExecutionOptions, SignAndExecutePayload, SignMessageOutput,
    SignMessagePayload, SignPersonalMessageOutput, SignTransactionOutput, SignTransactionPayload,
    WireAccount,
};
pub use request::{RemoteErrorPayload, Request, Response};
