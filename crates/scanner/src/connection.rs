//! WebSocket session ownership and reconnection.
//!
//! One task owns the transport for the whole process lifetime. Inbound
//! messages are applied to the store in strict arrival order; outbound
//! commands come in over a channel and only go out while the session is
//! open. On any close or transport error the task schedules exactly one
//! reconnect after a fixed delay and keeps retrying for as long as the
//! process runs — no backoff, no cap.

use crate::config::ConnectionConfig;
use crate::protocol::{self, ClientCommand, ServerMessage};
use crate::store::StateStore;
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    Closed,
    Error,
}

impl ConnectionStatus {
    /// Human label for the status indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting...",
            Self::Open => "Connected",
            Self::Closed => "Disconnected",
            Self::Error => "Connection Error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// How a session ended, deciding which status transitions to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Failed,
    Cancelled,
}

/// Cheap cloneable handle for callers that need to send commands or
/// observe the connection status.
#[derive(Clone)]
pub struct ConnectionHandle {
    outbound_tx: mpsc::UnboundedSender<ClientCommand>,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl ConnectionHandle {
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Hand a command to the connection task. Transmits only while the
    /// session is open; otherwise the command is dropped and counted,
    /// never an error. Returns whether the command reached the transport
    /// queue.
    pub fn send(&self, command: ClientCommand) -> bool {
        if self.status() != ConnectionStatus::Open {
            metrics::counter!("scanner_commands_dropped_total").increment(1);
            debug!(command = command.name(), "connection not open, dropping command");
            return false;
        }
        self.outbound_tx.send(command).is_ok()
    }
}

pub struct ConnectionManager {
    config: ConnectionConfig,
    store: Arc<StateStore>,
    status_tx: watch::Sender<ConnectionStatus>,
    outbound_rx: mpsc::UnboundedReceiver<ClientCommand>,
    // Keeps recv() pending rather than closed if every handle is dropped.
    _outbound_keepalive: mpsc::UnboundedSender<ClientCommand>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, store: Arc<StateStore>) -> (Self, ConnectionHandle) {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Idle);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle {
            outbound_tx: outbound_tx.clone(),
            status_rx,
        };
        (
            Self {
                config,
                store,
                status_tx,
                outbound_rx,
                _outbound_keepalive: outbound_tx,
            },
            handle,
        )
    }

    /// Run the connect/serve/reconnect loop until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            self.set_status(ConnectionStatus::Connecting);

            match tokio_tungstenite::connect_async(self.config.url.as_str()).await {
                Ok((ws, _response)) => {
                    info!(url = %self.config.url, "connected to scanner server");
                    self.set_status(ConnectionStatus::Open);

                    let end =
                        run_session(ws, &mut self.outbound_rx, &self.store, &cancel).await;
                    match end {
                        SessionEnd::Cancelled => {
                            self.set_status(ConnectionStatus::Closed);
                            return;
                        }
                        SessionEnd::Failed => self.set_status(ConnectionStatus::Error),
                        SessionEnd::Closed => {}
                    }
                }
                Err(e) => {
                    warn!(url = %self.config.url, error = %e, "connection attempt failed");
                    self.set_status(ConnectionStatus::Error);
                }
            }

            self.set_status(ConnectionStatus::Closed);
            self.discard_pending_commands();

            // Exactly one reconnect per close, after the fixed delay.
            metrics::counter!("scanner_reconnects_total").increment(1);
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Commands queued while offline never survive into the next session;
    /// a reconnect resends nothing.
    fn discard_pending_commands(&mut self) {
        let mut dropped: u64 = 0;
        while self.outbound_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            metrics::counter!("scanner_commands_dropped_total").increment(dropped);
            debug!(dropped, "discarded commands queued while offline");
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        if *self.status_tx.borrow() != status {
            debug!(status = %status, "connection status changed");
            self.status_tx.send_replace(status);
        }
    }
}

async fn run_session<S>(
    ws: WebSocketStream<S>,
    outbound_rx: &mut mpsc::UnboundedReceiver<ClientCommand>,
    store: &StateStore,
    cancel: &CancellationToken,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                info!("connection cancelled");
                let _ = sink.close().await;
                return SessionEnd::Cancelled;
            }
            command = outbound_rx.recv() => {
                let Some(command) = command else { continue };
                let text = match serde_json::to_string(&command) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, command = command.name(), "failed to serialize command");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!(error = %e, command = command.name(), "failed to send command");
                    metrics::counter!("scanner_commands_dropped_total").increment(1);
                    return SessionEnd::Failed;
                }
                metrics::counter!("scanner_commands_sent_total").increment(1);
                debug!(command = command.name(), "command sent");
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => handle_frame(store, &text),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("server closed the connection");
                        return SessionEnd::Closed;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error");
                        return SessionEnd::Failed;
                    }
                    // Ping/pong are answered by the library; binary is not
                    // part of the protocol.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Apply one inbound frame to the store, in arrival order.
fn handle_frame(store: &StateStore, text: &str) {
    metrics::counter!("scanner_messages_received_total").increment(1);
    match protocol::parse_server_message(text) {
        Some(ServerMessage::FullUpdate { data }) => {
            info!(count = data.len(), "full update received");
            store.apply_full_update(data);
        }
        Some(ServerMessage::AccountUpdate { data }) => {
            debug!(address = %data.address, stage = ?data.loading_stage, "account update received");
            store.apply_incremental_update(*data);
        }
        // Malformed or unrecognized frames are counted and logged by the
        // parser; state stays as it was.
        None => {}
    }
}
