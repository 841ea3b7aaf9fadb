//! Wallet client: pairing handshake, signing operations, reconnection
//! supervision.
//!
//! [`WalletClient`] is the surface a host consumes. Internally it is a
//! thin composition over the transport layer: every operation registers
//! a correlated pending request on the connection, sends one envelope,
//! and awaits exactly one outcome (response, deadline, or close sweep).
//!
//! # Pairing Handshake
//!
//! `connect()` runs a strict three-step sequence over a fresh
//! connection:
//!
//! 1. `requestConnectionKey` - short timeout, returns an opaque key
//! 2. present the key out-of-band via the [`PairingPresenter`]
//! 3. `authenticate` - long timeout, returns the account set once the
//!    user approves on the companion device
//!
//! No session state survives a closed connection; reconnection re-runs
//! the whole sequence with a fresh key.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::BridgeOptions;
use crate::presenter::{PairingPresenter, TracingPresenter};
use crate::protocol::{
    Command, ExecuteTransactionOutput, ExecutionOptions, Request, SignAndExecutePayload,
    SignMessageOutput, SignMessagePayload, SignPersonalMessageOutput, SignTransactionOutput,
    SignTransactionPayload, WireAccount,
};
use crate::transport::{CloseReason, Connection, ReconnectPhase, ReconnectState};

use super::account::WalletAccount;
use super::capabilities::{self, Capability};

// ============================================================================
// Constants
// ============================================================================

/// Timeout phase labels, one per remote operation.
const PHASE_CONNECTION_KEY: &str = "requestConnectionKey";
const PHASE_AUTHENTICATE: &str = "authenticate";
const PHASE_SIGN_MESSAGE: &str = "signPersonalMessage";
const PHASE_SIGN_TRANSACTION: &str = "signTransaction";
const PHASE_SIGN_AND_EXECUTE: &str = "signAndExecuteTransaction";

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the logical connection.
///
/// Exactly one value at any instant; transitions only on explicit
/// lifecycle events or a new connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Never connected.
    #[default]
    Idle,
    /// A pairing handshake is in progress.
    Connecting,
    /// Paired and ready for signing operations.
    Connected,
    /// Connection ended, manually or unexpectedly.
    Disconnected,
}

// ============================================================================
// SessionState
// ============================================================================

/// Mutable session state behind the client's lock.
struct SessionState {
    /// Current lifecycle state.
    phase: ConnectionState,
    /// The live connection, if any.
    connection: Option<Connection>,
    /// Pairing key for the current connection; cleared on disconnect
    /// and never reused across connections.
    pairing_key: Option<String>,
    /// Accounts authenticated by the current handshake.
    accounts: Vec<WalletAccount>,
}

impl SessionState {
    const fn new() -> Self {
        Self {
            phase: ConnectionState::Idle,
            connection: None,
            pairing_key: None,
            accounts: Vec::new(),
        }
    }

    /// Drops all per-connection state.
    fn clear(&mut self) -> Option<Connection> {
        self.phase = ConnectionState::Disconnected;
        self.pairing_key = None;
        self.accounts.clear();
        self.connection.take()
    }
}

// ============================================================================
// WalletClient
// ============================================================================

/// Shared inner state for a wallet client.
struct ClientInner {
    /// Bridge configuration.
    options: BridgeOptions,
    /// Collaborator that shows the pairing key to the user.
    presenter: Arc<dyn PairingPresenter>,
    /// Session state.
    state: Mutex<SessionState>,
    /// Reconnection attempt counter and backoff schedule.
    reconnect: Mutex<ReconnectState>,
}

/// Client for a remote signing agent reached over one persistent
/// duplex connection.
///
/// Cheap to clone; all clones share the session.
///
/// # Example
///
/// ```no_run
/// use mate_wallet_bridge::{BridgeOptions, Result, WalletClient};
///
/// # async fn example() -> Result<()> {
/// let client = WalletClient::new(BridgeOptions::new());
///
/// let accounts = client.connect().await?;
/// let output = client
///     .sign_personal_message(b"hello", &accounts[0])
///     .await?;
/// println!("signature: {}", output.signature);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WalletClient {
    /// Shared inner state.
    inner: Arc<ClientInner>,
}

impl fmt::Debug for WalletClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WalletClient")
            .field("endpoint", &self.inner.options.endpoint)
            .field("phase", &state.phase)
            .field("accounts", &state.accounts.len())
            .finish_non_exhaustive()
    }
}

impl Default for WalletClient {
    fn default() -> Self {
        Self::new(BridgeOptions::new())
    }
}

// ============================================================================
// WalletClient - Construction
// ============================================================================

impl WalletClient {
    /// Creates a client with the given options and a logging presenter.
    #[must_use]
    pub fn new(options: BridgeOptions) -> Self {
        Self::with_presenter(options, Arc::new(TracingPresenter))
    }

    /// Creates a client with a custom pairing key presenter.
    #[must_use]
    pub fn with_presenter(options: BridgeOptions, presenter: Arc<dyn PairingPresenter>) -> Self {
        let reconnect = ReconnectState::new(
            options.reconnect_base_delay,
            options.reconnect_max_attempts,
        );

        Self {
            inner: Arc::new(ClientInner {
                options,
                presenter,
                state: Mutex::new(SessionState::new()),
                reconnect: Mutex::new(reconnect),
            }),
        }
    }
}

// ============================================================================
// WalletClient - Accessors
// ============================================================================

impl WalletClient {
    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().phase
    }

    /// Returns `true` if paired and ready for signing operations.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns a snapshot of the authenticated accounts.
    ///
    /// Empty unless connected.
    #[must_use]
    pub fn accounts(&self) -> Vec<WalletAccount> {
        self.inner.state.lock().accounts.clone()
    }

    /// Returns the pairing key of the current connection, if any.
    #[must_use]
    pub fn pairing_key(&self) -> Option<String> {
        self.inner.state.lock().pairing_key.clone()
    }

    /// Returns the bridge configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.inner.options
    }

    /// Returns the static capability table.
    #[inline]
    #[must_use]
    pub const fn capabilities(&self) -> &'static [Capability] {
        capabilities::capabilities()
    }

    /// Returns reconnection attempts made since the last successful
    /// connect.
    #[inline]
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnect.lock().attempts()
    }
}

// ============================================================================
// WalletClient - Connect / Disconnect
// ============================================================================

impl WalletClient {
    /// Connects to the remote agent and runs the pairing handshake.
    ///
    /// Short-circuits with the cached account set if already connected;
    /// fails fast if a handshake is already in progress.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnecting`] if a handshake is in progress
    /// - [`Error::Transport`] if the connection cannot be established
    /// - [`Error::Presentation`] if the key cannot be shown
    /// - [`Error::Timeout`] if a handshake step exceeds its deadline
    /// - [`Error::Remote`] if the agent rejects a handshake step
    pub async fn connect(&self) -> Result<Vec<WalletAccount>> {
        {
            let mut state = self.inner.state.lock();
            match state.phase {
                ConnectionState::Connecting => return Err(Error::AlreadyConnecting),
                ConnectionState::Connected if !state.accounts.is_empty() => {
                    return Ok(state.accounts.clone());
                }
                _ => state.phase = ConnectionState::Connecting,
            }
        }

        match self.run_handshake().await {
            Ok((connection, accounts)) => {
                {
                    let mut state = self.inner.state.lock();
                    state.phase = ConnectionState::Connected;
                    state.accounts = accounts.clone();
                }
                self.inner.reconnect.lock().reset();
                self.spawn_close_monitor(&connection);

                info!(accounts = accounts.len(), "paired with remote agent");
                Ok(accounts)
            }
            Err(e) => {
                let connection = self.inner.state.lock().clear();
                if let Some(connection) = connection {
                    connection.shutdown();
                }
                Err(e)
            }
        }
    }

    /// Disconnects from the remote agent.
    ///
    /// Idempotent. Outstanding operations fail with
    /// [`Error::ConnectionClosed`]; no automatic reconnection follows a
    /// manual close.
    pub fn disconnect(&self) {
        let connection = self.inner.state.lock().clear();

        // Stops a supervisor that is already sleeping toward its next
        // attempt; the budget is restored on the next successful connect.
        self.inner.reconnect.lock().cancel();

        if let Some(connection) = connection {
            connection.shutdown();
        }
        debug!("manual disconnect");
    }

    /// Runs the three-step pairing handshake over a fresh connection.
    async fn run_handshake(&self) -> Result<(Connection, Vec<WalletAccount>)> {
        self.inner.options.validate()?;

        let connection = Connection::open(&self.inner.options.endpoint).await?;
        self.inner.state.lock().connection = Some(connection.clone());

        let key = self.request_pairing_key(&connection).await?;
        self.inner.state.lock().pairing_key = Some(key.clone());

        self.inner
            .presenter
            .present(&key)
            .await
            .map_err(|e| match e {
                e @ Error::Presentation { .. } => e,
                other => Error::presentation(other.to_string()),
            })?;

        let accounts = self.await_authentication(&connection, &key).await?;
        Ok((connection, accounts))
    }

    /// Step 1: asks the agent to issue a fresh pairing key.
    async fn request_pairing_key(&self, connection: &Connection) -> Result<String> {
        let value = connection
            .request(
                Request::new(Command::RequestConnectionKey {}),
                self.inner.options.request_timeout,
                PHASE_CONNECTION_KEY,
            )
            .await?;

        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::payload("connection key must be a string"))
    }

    /// Step 3: waits for the companion device to approve the key.
    async fn await_authentication(
        &self,
        connection: &Connection,
        key: &str,
    ) -> Result<Vec<WalletAccount>> {
        let value = connection
            .request(
                Request::new(Command::Authenticate {
                    key: key.to_string(),
                }),
                self.inner.options.authentication_timeout,
                PHASE_AUTHENTICATE,
            )
            .await?;

        let wires: Vec<WireAccount> = serde_json::from_value(value)
            .map_err(|e| Error::payload(format!("account set: {e}")))?;
        wires.into_iter().map(WalletAccount::from_wire).collect()
    }
}

// ============================================================================
// WalletClient - Reconnection Supervision
// ============================================================================

impl WalletClient {
    /// Spawns the task that reacts to this connection's close.
    fn spawn_close_monitor(&self, connection: &Connection) {
        let mut closed = connection.closed();
        let client = self.clone();

        tokio::spawn(async move {
            let reason = {
                match closed.wait_for(|reason| reason.is_some()).await {
                    Ok(reason) => (*reason).unwrap_or(CloseReason::Error),
                    // Loop task dropped without signaling; nothing to do.
                    Err(_) => return,
                }
            };
            client.handle_close(reason).await;
        });
    }

    /// Tears down session state and, for unexpected closes, drives the
    /// backoff schedule.
    ///
    /// The connection's event loop has already failed every pending
    /// request before the close reason is published, so nothing dangles
    /// by the time an attempt is scheduled.
    async fn handle_close(&self, reason: CloseReason) {
        debug!(?reason, "connection closed");
        self.inner.state.lock().clear();

        if reason == CloseReason::Manual {
            self.inner.reconnect.lock().reset();
            return;
        }

        loop {
            let delay = self.inner.reconnect.lock().schedule();
            let Some(delay) = delay else {
                warn!("reconnection ceiling reached, staying disconnected");
                return;
            };

            let attempt = self.inner.reconnect.lock().attempts();
            debug!(attempt, delay_ms = delay.as_millis() as u64, "reconnection scheduled");
            sleep(delay).await;

            {
                let mut reconnect = self.inner.reconnect.lock();
                // A manual disconnect during the sleep disarms the
                // scheduled attempt (cancel leaves phase Idle).
                if reconnect.phase() != ReconnectPhase::Scheduled {
                    debug!(attempt, "scheduled reconnection attempt cancelled");
                    return;
                }
                reconnect.begin_attempt();
            }
            match self.connect().await {
                Ok(_) => {
                    info!(attempt, "reconnected to remote agent");
                    return;
                }
                Err(e) => warn!(attempt, error = %e, "reconnection attempt failed"),
            }
        }
    }
}

// ============================================================================
// WalletClient - Signing Operations
// ============================================================================

impl WalletClient {
    /// Signs an arbitrary personal message.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no pairing handshake has completed
    /// - [`Error::Timeout`], [`Error::Remote`], [`Error::ConnectionClosed`]
    ///   per the outcome of the exchange
    pub async fn sign_personal_message(
        &self,
        message: &[u8],
        account: &WalletAccount,
    ) -> Result<SignPersonalMessageOutput> {
        let payload = SignMessagePayload::new(message, account);
        let value = self
            .request(Command::SignPersonalMessage(payload), PHASE_SIGN_MESSAGE)
            .await?;
        decode_output(value, PHASE_SIGN_MESSAGE)
    }

    /// Signs a message via the legacy `signMessage` shape.
    ///
    /// Delegates to [`Self::sign_personal_message`] and re-labels the
    /// output fields.
    pub async fn sign_message(
        &self,
        message: &[u8],
        account: &WalletAccount,
    ) -> Result<SignMessageOutput> {
        let output = self.sign_personal_message(message, account).await?;
        Ok(output.into())
    }

    /// Signs a serialized transaction block.
    pub async fn sign_transaction(
        &self,
        transaction_block: &str,
        account: &WalletAccount,
        chain: &str,
    ) -> Result<SignTransactionOutput> {
        let payload = SignTransactionPayload::new(transaction_block, account, chain);
        let value = self
            .request(Command::SignTransaction(payload), PHASE_SIGN_TRANSACTION)
            .await?;
        decode_output(value, PHASE_SIGN_TRANSACTION)
    }

    /// Signs a transaction block and submits it for execution.
    pub async fn sign_and_execute_transaction(
        &self,
        transaction_block: &str,
        account: &WalletAccount,
        chain: &str,
        execution: ExecutionOptions,
    ) -> Result<ExecuteTransactionOutput> {
        let payload = SignAndExecutePayload::new(transaction_block, account, chain, execution);
        let value = self
            .request(
                Command::SignAndExecuteTransaction(payload),
                PHASE_SIGN_AND_EXECUTE,
            )
            .await?;
        decode_output(value, PHASE_SIGN_AND_EXECUTE)
    }

    /// Issues one correlated request over the live connection.
    ///
    /// Requires state = Connected; concurrent operations do not block
    /// each other.
    async fn request(&self, command: Command, phase: &'static str) -> Result<Value> {
        let connection = {
            let state = self.inner.state.lock();
            if state.phase != ConnectionState::Connected {
                return Err(Error::NotConnected);
            }
            state.connection.clone().ok_or(Error::NotConnected)?
        };

        connection
            .request(
                Request::new(command),
                self.inner.options.request_timeout,
                phase,
            )
            .await
    }
}

/// Decodes a result value into a typed operation output.
fn decode_output<T: serde::de::DeserializeOwned>(value: Value, phase: &'static str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::payload(format!("{phase} output: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
