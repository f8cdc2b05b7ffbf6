//! WebSocket connection to the relay.
//!
//! The connection is an explicitly owned object, created once at application
//! startup and handed to whoever drives the open board's session. It is never
//! a process-wide singleton and never re-created per board.
//!
//! A background thread owns the socket; commands go in over a channel and
//! events come out over another, so `poll_events` never blocks the caller's
//! event loop.

use crate::protocol::{ClientMessage, ServerMessage};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tungstenite::{Message, connect};
use url::Url;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events surfaced by [`RelayConnection::poll_events`].
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
    /// A parsed relay message, ready for `BoardSession::handle_message`.
    Message(ServerMessage),
    Error { message: String },
}

/// Connection errors.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
}

enum WsCommand {
    Send(String),
    Close,
}

/// Client-side relay connection.
pub struct RelayConnection {
    state: ConnectionState,
    events: Vec<ConnectionEvent>,
    cmd_tx: Option<Sender<WsCommand>>,
    event_rx: Option<Receiver<ConnectionEvent>>,
    _thread: Option<JoinHandle<()>>,
}

impl RelayConnection {
    /// Create a disconnected connection.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            events: Vec::new(),
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Connect to the relay at `url` (`ws://` or `wss://`).
    pub fn connect(&mut self, url: &str) -> Result<(), ConnectError> {
        if self.cmd_tx.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }

        let parsed = Url::parse(url).map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(ConnectError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<ConnectionEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || {
            log::info!("relay thread: connecting to {}", url);

            let (mut socket, response) = match connect(url.as_str()) {
                Ok(ok) => ok,
                Err(e) => {
                    log::error!("relay connection failed: {}", e);
                    let _ = event_tx.send(ConnectionEvent::Error {
                        message: format!("connection failed: {}", e),
                    });
                    return;
                }
            };
            log::info!("relay connected, status: {}", response.status());
            let _ = event_tx.send(ConnectionEvent::Connected);

            // Short read timeout on the TCP stream keeps the loop responsive
            // to outgoing commands without busy-waiting.
            if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
            }

            loop {
                match cmd_rx.try_recv() {
                    Ok(WsCommand::Send(msg)) => {
                        if let Err(e) = socket.send(Message::Text(msg)) {
                            // Fire-and-forget: the event is dropped and local
                            // optimistic state stays authoritative.
                            log::error!("relay send error: {}", e);
                            break;
                        }
                    }
                    Ok(WsCommand::Close) => {
                        let _ = socket.close(None);
                        break;
                    }
                    Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                match socket.read() {
                    Ok(Message::Text(txt)) => match serde_json::from_str::<ServerMessage>(&txt) {
                        Ok(msg) => {
                            let _ = event_tx.send(ConnectionEvent::Message(msg));
                        }
                        Err(e) => {
                            // One malformed frame never takes the session down.
                            log::warn!("skipping malformed relay frame: {}", e);
                        }
                    },
                    Ok(Message::Ping(data)) => {
                        let _ = socket.send(Message::Pong(data));
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(tungstenite::Error::Io(ref e))
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(e) => {
                        log::error!("relay read error: {}", e);
                        break;
                    }
                }
            }

            log::info!("relay thread exiting");
            let _ = event_tx.send(ConnectionEvent::Disconnected);
        });

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);

        Ok(())
    }

    /// Disconnect from the relay.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Send a client message. Fire-and-forget; serialization errors and
    /// transport errors degrade to a dropped event.
    pub fn send(&self, msg: &ClientMessage) -> Result<(), ConnectError> {
        let tx = self.cmd_tx.as_ref().ok_or(ConnectError::NotConnected)?;
        match serde_json::to_string(msg) {
            Ok(json) => {
                tx.send(WsCommand::Send(json)).map_err(|_| ConnectError::NotConnected)
            }
            Err(e) => {
                log::error!("failed to serialize client message: {}", e);
                Ok(())
            }
        }
    }

    /// Drain all pending session messages (drains the queue). Non-blocking.
    pub fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    ConnectionEvent::Connected => self.state = ConnectionState::Connected,
                    ConnectionEvent::Disconnected => self.state = ConnectionState::Disconnected,
                    ConnectionEvent::Error { .. } => self.state = ConnectionState::Error,
                    ConnectionEvent::Message(_) => {}
                }
                self.events.push(event);
            }
        }
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for RelayConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_urls() {
        let mut conn = RelayConnection::new();
        assert!(matches!(
            conn.connect("http://example.com"),
            Err(ConnectError::InvalidUrl(_))
        ));
        assert!(matches!(conn.connect("not a url"), Err(ConnectError::InvalidUrl(_))));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn send_requires_connection() {
        let conn = RelayConnection::new();
        let msg = ClientMessage::Join { board: "b".to_string() };
        assert!(matches!(conn.send(&msg), Err(ConnectError::NotConnected)));
    }
}
