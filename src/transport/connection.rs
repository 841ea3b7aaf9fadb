//! WebSocket connection and event loop.
//!
//! One [`Connection`] owns the single duplex link to the remote agent.
//! A spawned event loop task serializes outgoing envelopes, dispatches
//! incoming envelopes to the correlation table by id, and observes
//! connection-lifecycle events.
//!
//! # Event Loop
//!
//! The loop selects over two sources:
//!
//! - Incoming messages from the agent (response envelopes)
//! - Outgoing requests and shutdown commands from the client
//!
//! On any exit path the loop first fails every outstanding request with
//! `ConnectionClosed`, then publishes the close reason, so supervision
//! never observes the close before the sweep has happened.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Request, Response};

use super::correlation::CorrelationTable;

// ============================================================================
// Types
// ============================================================================

/// The client-side WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outgoing half of the split stream.
type WsSink = SplitSink<WsStream, Message>;

// ============================================================================
// CloseReason
// ============================================================================

/// Why the event loop terminated.
///
/// Manual closes suppress reconnection; remote closes and transport
/// errors are eligible for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client requested shutdown.
    Manual,
    /// The agent closed the connection or the stream ended.
    Remote,
    /// The transport reported an error.
    Error,
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Serialize and send a request envelope.
    Send(Request),
    /// Close the socket and terminate the loop.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// The single duplex connection to the remote agent.
///
/// Cheap to clone; all clones share the event loop, the correlation
/// table, and the close signal.
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation table (shared with the event loop).
    correlation: Arc<CorrelationTable>,
    /// Observes the loop's close reason.
    closed_rx: watch::Receiver<Option<CloseReason>>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            correlation: Arc::clone(&self.correlation),
            closed_rx: self.closed_rx.clone(),
        }
    }
}

impl Connection {
    /// Establishes the connection to the agent endpoint.
    ///
    /// Resolves once the WebSocket handshake completes and the event
    /// loop is running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the connection cannot be
    /// established.
    pub async fn open(endpoint: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        debug!(endpoint, "connection established");
        Ok(Self::from_stream(ws_stream))
    }

    /// Wraps an established stream and spawns the event loop.
    fn from_stream(ws_stream: WsStream) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(CorrelationTable::new());
        let (closed_tx, closed_rx) = watch::channel(None);

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            closed_tx,
        ));

        Self {
            command_tx,
            correlation,
            closed_rx,
        }
    }

    /// Sends a request and awaits its correlated response.
    ///
    /// Registers the pending entry before the envelope leaves, then
    /// waits up to `deadline`. The entry resolves through exactly one
    /// path: matching response, deadline, or connection-close sweep.
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`] if the agent returned an error payload
    /// - [`Error::Timeout`] if no response arrived within `deadline`
    /// - [`Error::ConnectionClosed`] if the connection dropped first
    pub async fn request(
        &self,
        request: Request,
        deadline: Duration,
        phase: &'static str,
    ) -> Result<Value> {
        let id = request.id;
        let rx = self.correlation.register(id)?;

        if self
            .command_tx
            .send(ConnectionCommand::Send(request))
            .is_err()
        {
            // Loop already gone; the entry would otherwise dangle.
            self.correlation.remove(id);
            return Err(Error::ConnectionClosed);
        }

        match timeout(deadline, rx).await {
            Ok(Ok(result)) => result?.into_result(),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                self.correlation.remove(id);
                debug!(%id, phase, "request deadline elapsed");
                Err(Error::timeout(phase, deadline.as_millis() as u64))
            }
        }
    }

    /// Returns the number of requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.len()
    }

    /// Requests shutdown of the connection.
    ///
    /// Idempotent: repeated calls and calls after the loop already
    /// terminated are no-ops. Outstanding requests are failed with
    /// `ConnectionClosed` by the loop's exit sweep.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Returns a watch on the close reason.
    ///
    /// Holds `None` until the event loop terminates.
    #[must_use]
    pub fn closed(&self) -> watch::Receiver<Option<CloseReason>> {
        self.closed_rx.clone()
    }

    /// Event loop that owns the WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<CorrelationTable>,
        closed_tx: watch::Sender<Option<CloseReason>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let reason;

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::dispatch_incoming(text.as_str(), &correlation);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("connection closed by remote");
                            reason = CloseReason::Remote;
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "transport error");
                            reason = CloseReason::Error;
                            break;
                        }

                        None => {
                            debug!("stream ended");
                            reason = CloseReason::Remote;
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(request)) => {
                            Self::handle_send(request, &mut ws_write, &correlation).await;
                        }

                        Some(ConnectionCommand::Shutdown) | None => {
                            debug!("shutdown requested");
                            let _ = ws_write.close().await;
                            reason = CloseReason::Manual;
                            break;
                        }
                    }
                }
            }
        }

        // Outstanding requests are failed before the close is published,
        // so no reconnection can be scheduled while entries dangle.
        let swept = correlation.sweep();
        if swept > 0 {
            debug!(count = swept, "failed pending requests on close");
        }

        let _ = closed_tx.send(Some(reason));
        debug!(?reason, "event loop terminated");
    }

    /// Dispatches an incoming text frame to the correlation table.
    fn dispatch_incoming(text: &str, correlation: &CorrelationTable) {
        match from_str::<Response>(text) {
            Ok(response) => {
                let id = response.id;
                if correlation.resolve(id, response) {
                    trace!(%id, "response dispatched");
                } else {
                    // Already resolved, timed out, or unsolicited.
                    debug!(%id, "response for unknown request, discarded");
                }
            }
            Err(e) => {
                // Cannot be attributed to any pending request.
                warn!(error = %e, "malformed envelope dropped");
            }
        }
    }

    /// Serializes and sends one request envelope.
    async fn handle_send(
        request: Request,
        ws_write: &mut WsSink,
        correlation: &CorrelationTable,
    ) {
        let id = request.id;

        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                correlation.fail(id, Error::Json(e));
                return;
            }
        };

        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            correlation.fail(id, Error::transport(e.to_string()));
            return;
        }

        trace!(%id, method = request.command.method(), "request sent");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use crate::protocol::Command;

    /// Binds a local mock agent and returns its ws:// url plus the task
    /// driving `handler` over the accepted stream.
    async fn spawn_agent<F, Fut>(handler: F) -> (String, JoinHandle<()>)
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("ws://{}", listener.local_addr().expect("addr"));

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");
            handler(ws).await;
        });

        (url, handle)
    }

    /// Reads the next text frame as a JSON value.
    async fn next_request(ws: &mut WebSocketStream<TcpStream>) -> Value {
        loop {
            match ws.next().await.expect("frame").expect("ok") {
                Message::Text(text) => return from_str(text.as_str()).expect("json"),
                Message::Close(_) => panic!("connection closed before request"),
                _ => {}
            }
        }
    }

    async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: Value) {
        ws.send(Message::Text(value.to_string().into()))
            .await
            .expect("send");
    }

    #[tokio::test]
    async fn test_open_fails_when_no_listener() {
        let result = Connection::open("ws://127.0.0.1:1").await;
        assert!(matches!(result, Err(Error::Transport { .. })));
    }

    #[tokio::test]
    async fn test_request_resolves_with_matching_response() {
        let (url, agent) = spawn_agent(|mut ws| async move {
            let request = next_request(&mut ws).await;
            assert_eq!(request["method"], "requestConnectionKey");
            send_json(&mut ws, json!({ "id": request["id"], "result": "abc123" })).await;
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let value = connection
            .request(
                Request::new(Command::RequestConnectionKey {}),
                Duration::from_secs(5),
                "requestConnectionKey",
            )
            .await
            .expect("resolved");

        assert_eq!(value, "abc123");
        assert_eq!(connection.pending_count(), 0);
        agent.await.expect("agent");
    }

    #[tokio::test]
    async fn test_request_times_out_and_entry_is_removed() {
        let (url, _agent) = spawn_agent(|mut ws| async move {
            // Swallow the request, never respond.
            let _ = next_request(&mut ws).await;
            // Keep the connection open past the client's deadline.
            tokio::time::sleep(Duration::from_secs(2)).await;
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let result = connection
            .request(
                Request::new(Command::Authenticate {
                    key: "k".to_string(),
                }),
                Duration::from_millis(100),
                "authenticate",
            )
            .await;

        match result {
            Err(Error::Timeout { phase, .. }) => assert_eq!(phase, "authenticate"),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_error_payload_surfaces() {
        let (url, agent) = spawn_agent(|mut ws| async move {
            let request = next_request(&mut ws).await;
            send_json(
                &mut ws,
                json!({ "id": request["id"], "error": { "message": "user declined" } }),
            )
            .await;
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let result = connection
            .request(
                Request::new(Command::RequestConnectionKey {}),
                Duration::from_secs(5),
                "requestConnectionKey",
            )
            .await;

        match result {
            Err(Error::Remote { message }) => assert_eq!(message, "user declined"),
            other => panic!("expected remote error, got {other:?}"),
        }
        agent.await.expect("agent");
    }

    #[tokio::test]
    async fn test_malformed_envelope_does_not_fail_pending() {
        let (url, agent) = spawn_agent(|mut ws| async move {
            let request = next_request(&mut ws).await;
            send_json(&mut ws, json!({ "garbage": true })).await;
            send_json(&mut ws, json!({ "id": request["id"], "result": 7 })).await;
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let value = connection
            .request(
                Request::new(Command::RequestConnectionKey {}),
                Duration::from_secs(5),
                "requestConnectionKey",
            )
            .await
            .expect("resolved despite malformed frame");

        assert_eq!(value, 7);
        agent.await.expect("agent");
    }

    #[tokio::test]
    async fn test_remote_close_sweeps_pending_requests() {
        let (url, agent) = spawn_agent(|mut ws| async move {
            // Wait for three requests, then drop the connection.
            for _ in 0..3 {
                let _ = next_request(&mut ws).await;
            }
            ws.close(None).await.expect("close");
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let futures: Vec<_> = (0..3)
            .map(|_| {
                connection.request(
                    Request::new(Command::RequestConnectionKey {}),
                    Duration::from_secs(5),
                    "requestConnectionKey",
                )
            })
            .collect();

        let results = futures_util::future::join_all(futures).await;
        for result in results {
            assert!(matches!(result, Err(Error::ConnectionClosed)));
        }

        let mut closed = connection.closed();
        closed
            .wait_for(|reason| reason.is_some())
            .await
            .expect("close signal");
        assert_eq!(*closed.borrow(), Some(CloseReason::Remote));
        agent.await.expect("agent");
    }

    #[tokio::test]
    async fn test_shutdown_reports_manual_close() {
        let (url, _agent) = spawn_agent(|mut ws| async move {
            // Hold the connection open until the client closes it.
            while let Some(Ok(message)) = ws.next().await {
                if matches!(message, Message::Close(_)) {
                    break;
                }
            }
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        connection.shutdown();
        // Repeated shutdown is a no-op.
        connection.shutdown();

        let mut closed = connection.closed();
        closed
            .wait_for(|reason| reason.is_some())
            .await
            .expect("close signal");
        assert_eq!(*closed.borrow(), Some(CloseReason::Manual));
    }

    #[tokio::test]
    async fn test_request_after_shutdown_fails_not_dangling() {
        let (url, _agent) = spawn_agent(|mut ws| async move {
            while let Some(Ok(message)) = ws.next().await {
                if matches!(message, Message::Close(_)) {
                    break;
                }
            }
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        connection.shutdown();
        let mut closed = connection.closed();
        closed
            .wait_for(|reason| reason.is_some())
            .await
            .expect("close signal");

        let result = connection
            .request(
                Request::new(Command::RequestConnectionKey {}),
                Duration::from_secs(1),
                "requestConnectionKey",
            )
            .await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert_eq!(connection.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_order_responses_match_by_id() {
        let (url, agent) = spawn_agent(|mut ws| async move {
            let first = next_request(&mut ws).await;
            let second = next_request(&mut ws).await;
            // Answer in reverse arrival order.
            send_json(&mut ws, json!({ "id": second["id"], "result": "second" })).await;
            send_json(&mut ws, json!({ "id": first["id"], "result": "first" })).await;
        })
        .await;

        let connection = Connection::open(&url).await.expect("open");
        let first = connection.request(
            Request::new(Command::RequestConnectionKey {}),
            Duration::from_secs(5),
            "requestConnectionKey",
        );
        let second = connection.request(
            Request::new(Command::Authenticate {
                key: "k".to_string(),
            }),
            Duration::from_secs(5),
            "authenticate",
        );

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.expect("first"), "first");
        assert_eq!(second.expect("second"), "second");
        agent.await.expect("agent");
    }
}
