//! WebSocket connection state management.
//!
//! [`Connection`] is the state object shared by every client variant: the
//! target URL, the lifecycle state, the registered user and the outbound
//! queue of the open socket. Handler hooks receive it mutably.

use std::fmt;

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::events::{ClientEvent, Emitted};
use super::messages::Registration;
use crate::types::UserId;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No socket.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Socket open, registration not yet acknowledged.
    Connected,
    /// Server acknowledged registration.
    Registered,
}

impl ConnectionState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Registered => "registered",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state shared by all client variants.
#[derive(Debug)]
pub struct Connection {
    url: String,
    state: ConnectionState,
    user_id: Option<UserId>,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    /// Incremented for every connection attempt; frames from older sockets
    /// are dropped.
    generation: u64,
    /// Generation of a socket the client closed whose close hook is pending.
    closing: Option<u64>,
    emitted: Vec<Emitted>,
}

impl Connection {
    /// Creates a disconnected connection targeting `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Disconnected,
            user_id: None,
            outbound: None,
            generation: 0,
            closing: None,
            emitted: Vec::new(),
        }
    }

    /// Returns the target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the registered user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the current connection generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if a socket is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Returns true if registered and the socket is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Registered && self.is_open()
    }

    /// Sends the registration handshake.
    ///
    /// Returns false without sending if no socket is open.
    pub fn register(&mut self, registration: &Registration) -> bool {
        if !self.is_open() {
            warn!("socket not open, cannot register");
            return false;
        }

        let json = match serde_json::to_string(registration) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize registration");
                return false;
            }
        };

        debug!(user_id = %registration.user_id, "sending registration");
        if !self.transmit(Message::Text(json.into())) {
            return false;
        }
        self.user_id = Some(registration.user_id);
        true
    }

    /// Sends a text frame.
    ///
    /// Returns false without sending unless the connection is registered and
    /// the socket is open.
    pub fn send(&mut self, text: impl Into<String>) -> bool {
        if !self.is_open() {
            warn!("socket not open, message dropped");
            return false;
        }

        if self.state != ConnectionState::Registered {
            warn!(state = %self.state, "not registered, message dropped");
            return false;
        }

        let text = text.into();
        debug!(message = %text, "sending message");
        self.transmit(Message::Text(text.into()))
    }

    /// Queues an event for publication after the current hook returns.
    pub fn emit(&mut self, name: &'static str, event: ClientEvent) {
        self.emitted.push(Emitted { name, event });
    }

    /// Drains queued events.
    pub fn take_emitted(&mut self) -> Vec<Emitted> {
        std::mem::take(&mut self.emitted)
    }

    /// Closes the socket if open and resets to disconnected.
    ///
    /// Frames still arriving on the closed socket are dropped. Its close hook
    /// runs once, unless a new attempt starts first. A pending attempt is
    /// abandoned and its socket closed once it opens.
    pub fn disconnect(&mut self) {
        if self.is_open() {
            self.transmit(Message::Close(None));
            debug!(url = %self.url, "socket closed by client");
        }
        if self.outbound.take().is_some() {
            self.closing = Some(self.generation);
        }
        self.generation += 1;
        self.reset();
    }

    /// Returns true, once, if `generation` is the socket the client closed.
    pub(crate) fn take_closing(&mut self, generation: u64) -> bool {
        if self.closing == Some(generation) {
            self.closing = None;
            true
        } else {
            false
        }
    }

    /// Starts a connection attempt.
    ///
    /// Returns the attempt's generation, or `None` if a socket is open or
    /// being opened.
    pub(crate) fn begin_connect(&mut self) -> Option<u64> {
        if self.state != ConnectionState::Disconnected {
            return None;
        }
        self.generation += 1;
        self.closing = None;
        self.state = ConnectionState::Connecting;
        Some(self.generation)
    }

    /// Attaches the outbound queue of a freshly opened socket.
    pub(crate) fn attach(&mut self, outbound: mpsc::UnboundedSender<Message>) {
        self.outbound = Some(outbound);
        self.state = ConnectionState::Connected;
    }

    /// Records a registration acknowledgement.
    pub(crate) fn authenticate(&mut self, user_id: Option<UserId>) {
        self.state = ConnectionState::Registered;
        self.user_id = user_id;
    }

    /// Drops the socket and clears state and user.
    pub(crate) fn detach(&mut self) {
        self.outbound = None;
        self.reset();
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.user_id = None;
    }

    fn transmit(&self, message: Message) -> bool {
        match &self.outbound {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}
