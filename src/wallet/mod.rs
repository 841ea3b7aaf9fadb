//! Wallet surface exposed to adapter hosts.
//!
//! This module contains the caller-facing types:
//!
//! - [`WalletClient`] - connect, disconnect, and signing operations
//! - [`WalletAccount`] - authenticated account descriptors
//! - [`Capability`] - the static capability table

// ============================================================================
// Submodules
// ============================================================================

/// Authenticated account descriptors.
pub mod account;

/// Static capability table.
pub mod capabilities;

/// Wallet client facade.
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use account::WalletAccount;
pub use capabilities::{CAPABILITIES, Capability, capabilities, supports};
pub use client::{ConnectionState, WalletClient};
