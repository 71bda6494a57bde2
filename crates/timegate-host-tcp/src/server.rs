//! TCP server implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use timegate_host_api::{HostError, HostResult, LoginDecision, LoginGate, SessionHost};
use timegate_util::IdentityId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{TcpHostError, TcpHostResult};

/// Message pushed to a session's writer task
enum Outbound {
    Line(String),
    /// Final message; the writer closes the connection after sending it
    Kick(String),
}

struct SessionHandle {
    display_name: String,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

/// TCP session host
///
/// Every connection is gated at handshake time; the roster only ever holds
/// admitted sessions. The roster lock is held for map operations only, never
/// across IO.
pub struct TcpSessionHost {
    listen_addr: SocketAddr,
    listener: Option<TcpListener>,
    sessions: Arc<RwLock<HashMap<IdentityId, SessionHandle>>>,
    gate: Arc<dyn LoginGate>,
}

impl TcpSessionHost {
    pub fn new(listen_addr: SocketAddr, gate: Arc<dyn LoginGate>) -> Self {
        Self {
            listen_addr,
            listener: None,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            gate,
        }
    }

    /// Bind the listener
    pub async fn start(&mut self) -> TcpHostResult<()> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        info!(addr = %listener.local_addr()?, "TCP session host listening");
        self.listener = Some(listener);
        Ok(())
    }

    /// Actual bound address (useful when listening on port 0)
    pub fn local_addr(&self) -> TcpHostResult<SocketAddr> {
        let listener = self.listener.as_ref().ok_or(TcpHostError::NotStarted)?;
        Ok(listener.local_addr()?)
    }

    /// Accept connections in a loop
    pub async fn run(&self) -> TcpHostResult<()> {
        let listener = self.listener.as_ref().ok_or(TcpHostError::NotStarted)?;

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "Connection accepted");
                    self.handle_session(stream).await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn handle_session(&self, stream: TcpStream) {
        let sessions = self.sessions.clone();
        let gate = self.gate.clone();

        tokio::spawn(async move {
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();

            // Handshake: a single HELLO line decides admit/deny
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }

            let (identity, display_name) = match parse_hello(line.trim()) {
                Some(parsed) => parsed,
                None => {
                    warn!(line = %line.trim(), "Malformed handshake");
                    let _ = write_half.write_all(b"ERR malformed handshake\n").await;
                    return;
                }
            };

            match gate.decide(&identity) {
                LoginDecision::Admit => {}
                LoginDecision::Deny { message } => {
                    let reply = format!("DENY {}\n", escape_line(&message));
                    let _ = write_half.write_all(reply.as_bytes()).await;
                    return;
                }
            }

            let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
            // Kept to tell this connection's handle apart from a later
            // replacement during cleanup
            let handle_tag = outbound_tx.clone();
            {
                let mut sessions = sessions.write().unwrap();
                // A reconnect under the same identity replaces the old
                // handle; the stale writer ends when its channel closes
                sessions.insert(
                    identity,
                    SessionHandle {
                        display_name: display_name.clone(),
                        outbound_tx,
                    },
                );
            }

            info!(identity = %identity, display_name = %display_name, "Session admitted");

            if write_half.write_all(b"OK\n").await.is_err() {
                remove_if_current(&sessions, &identity, &handle_tag);
                return;
            }

            // Writer task: drains the outbound channel until it closes or a
            // kick arrives
            tokio::spawn(async move {
                while let Some(outbound) = outbound_rx.recv().await {
                    match outbound {
                        Outbound::Line(mut text) => {
                            text.push('\n');
                            if write_half.write_all(text.as_bytes()).await.is_err() {
                                break;
                            }
                        }
                        Outbound::Kick(message) => {
                            let reply = format!("KICK {}\n", escape_line(&message));
                            let _ = write_half.write_all(reply.as_bytes()).await;
                            break;
                        }
                    }
                }
                let _ = write_half.shutdown().await;
            });

            // Reader task: the session lives until EOF or a read error
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!(identity = %identity, "Session disconnected (EOF)");
                        break;
                    }
                    Ok(_) => {
                        // No client commands after the handshake yet
                        debug!(identity = %identity, line = %line.trim(), "Ignoring client line");
                    }
                    Err(e) => {
                        debug!(identity = %identity, error = %e, "Read error");
                        break;
                    }
                }
            }

            remove_if_current(&sessions, &identity, &handle_tag);
        });
    }

    /// Display name of a connected session
    pub fn display_name(&self, identity: &IdentityId) -> Option<String> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(identity).map(|h| h.display_name.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

#[async_trait]
impl SessionHost for TcpSessionHost {
    fn connected_identities(&self) -> Vec<IdentityId> {
        self.sessions.read().unwrap().keys().copied().collect()
    }

    async fn disconnect(&self, identity: &IdentityId, message: &str) -> HostResult<()> {
        let handle = {
            let mut sessions = self.sessions.write().unwrap();
            sessions.remove(identity)
        };

        match handle {
            Some(handle) => {
                info!(identity = %identity, "Session disconnected by server");
                handle
                    .outbound_tx
                    .send(Outbound::Kick(message.to_string()))
                    .map_err(|_| HostError::DisconnectFailed("Writer already gone".into()))
            }
            None => Err(HostError::NotConnected(*identity)),
        }
    }
}

/// Remove a session only while the map still holds this connection's own
/// handle. A reconnect under the same identity replaces the handle, and the
/// replaced connection's cleanup must not evict the live session.
fn remove_if_current(
    sessions: &RwLock<HashMap<IdentityId, SessionHandle>>,
    identity: &IdentityId,
    handle_tag: &mpsc::UnboundedSender<Outbound>,
) {
    let mut sessions = sessions.write().unwrap();
    if sessions
        .get(identity)
        .is_some_and(|h| h.outbound_tx.same_channel(handle_tag))
    {
        sessions.remove(identity);
    }
}

/// Parse a `HELLO <uuid> <display-name>` handshake line
fn parse_hello(line: &str) -> Option<(IdentityId, String)> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("HELLO") {
        return None;
    }
    let identity: IdentityId = parts.next()?.parse().ok()?;
    let display_name = parts.next()?.to_string();
    if parts.next().is_some() {
        return None;
    }
    Some((identity, display_name))
}

/// Flatten a multi-line message onto one protocol line
fn escape_line(message: &str) -> String {
    message.replace('\n', "\\n")
}
