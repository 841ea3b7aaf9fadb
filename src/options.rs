//! Bridge configuration options.
//!
//! Provides a type-safe builder for the connection endpoint, timeout
//! classes, and the reconnection policy.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use mate_wallet_bridge::BridgeOptions;
//!
//! let options = BridgeOptions::new()
//!     .with_endpoint("ws://localhost:3001")
//!     .with_request_timeout(Duration::from_secs(30))
//!     .with_authentication_timeout(Duration::from_secs(300));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default remote agent endpoint.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:3001";

/// Default deadline for key requests and signing operations (30s).
///
/// Short bound appropriate for a present, responsive device.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for the remote-authentication wait (5 minutes).
///
/// Long bound appropriate for a human scanning a code and approving on
/// a separate device.
const DEFAULT_AUTHENTICATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Default backoff unit between reconnection attempts.
const DEFAULT_RECONNECT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default reconnection ceiling.
const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 5;

// ============================================================================
// BridgeOptions
// ============================================================================

/// Configuration for a [`WalletClient`](crate::WalletClient).
///
/// Controls where the remote agent lives, how long each operation class
/// waits, and how persistently the bridge reconnects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// WebSocket endpoint of the remote agent.
    pub endpoint: String,

    /// Deadline for key requests and signing operations.
    pub request_timeout: Duration,

    /// Deadline for the remote-authentication wait after key issuance.
    pub authentication_timeout: Duration,

    /// Backoff unit; attempt *n* waits `base × n`.
    pub reconnect_base_delay: Duration,

    /// Automatic reconnection attempts before giving up.
    pub reconnect_max_attempts: u32,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            authentication_timeout: DEFAULT_AUTHENTICATION_TIMEOUT,
            reconnect_base_delay: DEFAULT_RECONNECT_BASE_DELAY,
            reconnect_max_attempts: DEFAULT_RECONNECT_MAX_ATTEMPTS,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Sets the remote agent endpoint.
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the deadline for key requests and signing operations.
    #[inline]
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the deadline for the remote-authentication wait.
    #[inline]
    #[must_use]
    pub const fn with_authentication_timeout(mut self, timeout: Duration) -> Self {
        self.authentication_timeout = timeout;
        self
    }

    /// Sets the reconnection backoff unit.
    #[inline]
    #[must_use]
    pub const fn with_reconnect_base_delay(mut self, delay: Duration) -> Self {
        self.reconnect_base_delay = delay;
        self
    }

    /// Sets the reconnection ceiling. Zero disables automatic
    /// reconnection entirely.
    #[inline]
    #[must_use]
    pub const fn with_reconnect_max_attempts(mut self, attempts: u32) -> Self {
        self.reconnect_max_attempts = attempts;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeOptions {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint is not a valid
    /// `ws://`/`wss://` URL or a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("invalid endpoint {:?}: {e}", self.endpoint)))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "endpoint scheme must be ws or wss, got {:?}",
                url.scheme()
            )));
        }

        if self.request_timeout.is_zero() || self.authentication_timeout.is_zero() {
            return Err(Error::config("timeouts must be greater than zero"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
