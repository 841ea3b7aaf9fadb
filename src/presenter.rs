//! Pairing key presentation.
//!
//! During the pairing handshake the issued key has to reach the user
//! out-of-band (typically rendered as a scannable code) so the
//! companion device can authenticate the session. The connection core
//! never touches a rendering mechanism; it hands the key to a
//! [`PairingPresenter`] and treats any failure as a presentation error.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

// ============================================================================
// PairingPresenter
// ============================================================================

/// Collaborator that shows a pairing key to the user.
///
/// Implementations render the key however fits the host: a QR pop-up,
/// a terminal code, a deep link. Returning an error aborts the
/// handshake with [`Error::Presentation`](crate::Error::Presentation).
#[async_trait]
pub trait PairingPresenter: Send + Sync {
    /// Presents the pairing key to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be shown (for example a
    /// blocked pop-up window).
    async fn present(&self, key: &str) -> Result<()>;
}

// ============================================================================
// TracingPresenter
// ============================================================================

/// Presenter that logs the pairing key.
///
/// Useful for headless hosts and tests; production hosts supply their
/// own renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPresenter;

#[async_trait]
impl PairingPresenter for TracingPresenter {
    async fn present(&self, key: &str) -> Result<()> {
        info!(key, "pairing key issued, waiting for companion device");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracing_presenter_always_succeeds() {
        let presenter = TracingPresenter;
        assert!(presenter.present("abc123").await.is_ok());
    }
}
