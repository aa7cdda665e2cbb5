//! Connection state plus handler, driven by socket events.
//!
//! [`Session`] is the synchronous core of a client: the async driver in
//! [`super::client`] feeds it socket events, and each event method returns
//! the bus events the hooks queued. Events tagged with a stale generation
//! belong to an abandoned socket and are ignored, except the close of a
//! socket the client itself closed, which still reaches the close hook.

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::connection::Connection;
use super::error::WsError;
use super::events::Emitted;
use super::handler::{ClientHandler, CloseInfo};
use super::messages::Inbound;

/// Outcome of delivering a freshly opened socket to the session.
#[derive(Debug)]
pub enum OpenOutcome {
    /// The socket was attached; publish these events.
    Attached(Vec<Emitted>),
    /// The attempt was abandoned while connecting; close the socket.
    Abandoned,
}

/// A connection and its handler.
#[derive(Debug)]
pub struct Session<H> {
    connection: Connection,
    handler: H,
}

impl<H: ClientHandler> Session<H> {
    /// Creates a disconnected session for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, handler: H) -> Self {
        Self {
            connection: Connection::new(url),
            handler,
        }
    }

    /// Returns the connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns the connection mutably.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the connection and the handler, both mutably.
    pub fn parts_mut(&mut self) -> (&mut Connection, &mut H) {
        (&mut self.connection, &mut self.handler)
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation == self.connection.generation() {
            true
        } else {
            debug!(
                generation,
                current = self.connection.generation(),
                "dropping event from stale socket"
            );
            false
        }
    }

    /// Delivers an opened socket.
    pub fn handle_open(
        &mut self,
        generation: u64,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> OpenOutcome {
        if !self.is_current(generation) {
            return OpenOutcome::Abandoned;
        }
        self.connection.attach(outbound);
        debug!(url = self.connection.url(), "socket connected");
        self.handler.on_open(&mut self.connection);
        OpenOutcome::Attached(self.connection.take_emitted())
    }

    /// Delivers an inbound text frame.
    ///
    /// An `authenticated` status moves the connection to registered before the
    /// message hook runs.
    pub fn handle_text(&mut self, generation: u64, text: &str) -> Vec<Emitted> {
        if !self.is_current(generation) {
            return Vec::new();
        }

        let inbound = Inbound::parse(text);
        if inbound.payload.is_authenticated() {
            let user_id = inbound.payload.user_id();
            self.connection.authenticate(user_id);
            debug!(user_id = ?user_id, "registration acknowledged");
        }

        self.handler.on_message(&mut self.connection, &inbound);
        self.connection.take_emitted()
    }

    /// Delivers a socket close.
    pub fn handle_close(&mut self, generation: u64, close: &CloseInfo) -> Vec<Emitted> {
        if self.connection.take_closing(generation) {
            debug!(code = close.code, "client-initiated close completed");
            self.handler.on_close(&mut self.connection, close);
            return self.connection.take_emitted();
        }
        if !self.is_current(generation) {
            return Vec::new();
        }
        self.connection.detach();
        self.handler.on_close(&mut self.connection, close);
        self.connection.take_emitted()
    }

    /// Delivers a transport error, including a failed handshake.
    pub fn handle_error(&mut self, generation: u64, err: &WsError) -> Vec<Emitted> {
        if !self.is_current(generation) {
            return Vec::new();
        }
        self.connection.detach();
        self.handler.on_error(&mut self.connection, err);
        self.connection.take_emitted()
    }
}
