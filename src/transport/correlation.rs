//! Correlation table for outstanding requests.
//!
//! Maps a correlation id to the oneshot completion of its pending
//! request. Every registered id resolves through exactly one of three
//! paths: a matching response envelope, a per-operation deadline, or a
//! connection-close sweep. Removal and completion happen under the same
//! lock acquisition, so whichever path runs first wins and the entry is
//! gone before the second path looks for it.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::Response;

// ============================================================================
// Constants
// ============================================================================

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// Completion side of one pending request.
type PendingSender = oneshot::Sender<Result<Response>>;

/// Receiving side handed to the awaiting caller.
pub type PendingReceiver = oneshot::Receiver<Result<Response>>;

// ============================================================================
// CorrelationTable
// ============================================================================

/// Table of outstanding request completions keyed by correlation id.
///
/// Exclusively owned by the connection; callers interact only through
/// `register`/`resolve`/`fail`/`remove` so the removal-then-complete
/// discipline cannot be bypassed.
#[derive(Default)]
pub struct CorrelationTable {
    /// Pending completions by correlation id.
    entries: Mutex<FxHashMap<RequestId, PendingSender>>,
}

impl CorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending request and returns its completion receiver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the pending-request limit is
    /// reached.
    pub fn register(&self, id: RequestId) -> Result<PendingReceiver> {
        let mut entries = self.entries.lock();
        if entries.len() >= MAX_PENDING_REQUESTS {
            return Err(Error::transport(format!(
                "too many pending requests: {}/{}",
                entries.len(),
                MAX_PENDING_REQUESTS
            )));
        }

        let (tx, rx) = oneshot::channel();
        entries.insert(id, tx);
        Ok(rx)
    }

    /// Resolves the entry for `id` with a response envelope.
    ///
    /// Returns `false` if no entry exists, meaning the request already
    /// resolved, timed out, or the envelope was unsolicited.
    pub fn resolve(&self, id: RequestId, response: Response) -> bool {
        match self.entries.lock().remove(&id) {
            Some(tx) => {
                let _ = tx.send(Ok(response));
                true
            }
            None => false,
        }
    }

    /// Fails the entry for `id` with the given error.
    ///
    /// Returns `false` if no entry exists.
    pub fn fail(&self, id: RequestId, error: Error) -> bool {
        match self.entries.lock().remove(&id) {
            Some(tx) => {
                let _ = tx.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Removes the entry for `id` without completing it.
    ///
    /// Used by the deadline path after the caller has already reported
    /// the timeout; a response racing in after this point is discarded.
    pub fn remove(&self, id: RequestId) -> bool {
        self.entries.lock().remove(&id).is_some()
    }

    /// Fails every outstanding entry with [`Error::ConnectionClosed`].
    ///
    /// Returns the number of entries swept. Called on any disconnect
    /// path, manual or remote, so no caller is left dangling.
    pub fn sweep(&self) -> usize {
        let pending: Vec<_> = {
            let mut entries = self.entries.lock();
            entries.drain().collect()
        };
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        count
    }

    /// Returns the number of outstanding entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no entries are outstanding.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns `true` if `id` is still outstanding.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.lock().contains_key(&id)
    }
}

// ============================================================================
// Tests
// ============================================================================
