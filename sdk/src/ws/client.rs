//! WebSocket client implementation.
//!
//! Provides the async driver shared by every client variant.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::config::WsConfig;
use super::connection::ConnectionState;
use super::error::WsError;
use super::events::{ClientBus, Emitted};
use super::handler::{BaseHandler, ClientHandler, CloseInfo};
use super::messages::Registration;
use super::session::{OpenOutcome, Session};
use crate::types::UserId;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Client for the `/ws/base` endpoint.
pub type BaseClient = WsClient<BaseHandler>;

/// WebSocket client parameterised by its handler variant.
pub struct WsClient<H> {
    config: WsConfig,
    session: Arc<Mutex<Session<H>>>,
    bus: Arc<ClientBus>,
}

impl<H> fmt::Debug for WsClient<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<H: ClientHandler> WsClient<H> {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: WsConfig, handler: H, bus: Arc<ClientBus>) -> Result<Self, WsError> {
        config.validate()?;

        let session = Session::new(config.url.clone(), handler);

        Ok(Self {
            config,
            session: Arc::new(Mutex::new(session)),
            bus,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Returns the bus this client publishes on.
    #[must_use]
    pub fn bus(&self) -> &Arc<ClientBus> {
        &self.bus
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.with_session(|s| s.connection().state())
    }

    /// Returns the registered user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.with_session(|s| s.connection().user_id())
    }

    /// Returns true if registered and the socket is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.with_session(|s| s.connection().is_ready())
    }

    /// Connects to the WebSocket server.
    ///
    /// Does nothing if already connected or connecting. The open hook runs
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails; the state is then
    /// disconnected and the error hook has run.
    pub async fn connect(&self) -> Result<(), WsError> {
        let Some(generation) = self.with_session(|s| s.connection_mut().begin_connect()) else {
            debug!(url = %self.config.url, "already connected or connecting");
            return Ok(());
        };

        info!(url = %self.config.url, "connecting");

        let ws_stream = match tokio_tungstenite::connect_async(self.config.url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                let err = WsError::Connection(e.to_string());
                warn!(url = %self.config.url, error = %err, "connection failed");
                let emitted = self.with_session(|s| s.handle_error(generation, &err));
                self.publish(emitted);
                return Err(err);
            }
        };

        let (sink, source) = ws_stream.split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        match self.with_session(|s| s.handle_open(generation, outbound_tx.clone())) {
            OpenOutcome::Attached(emitted) => {
                spawn_writer(sink, outbound_rx);
                self.spawn_reader(source, generation);
                self.publish(emitted);
                Ok(())
            }
            OpenOutcome::Abandoned => {
                debug!(url = %self.config.url, "connection abandoned while connecting, closing");
                let _ = outbound_tx.send(Message::Close(None));
                drop(outbound_tx);
                spawn_writer(sink, outbound_rx);
                Ok(())
            }
        }
    }

    /// Closes the socket if open and resets to disconnected.
    ///
    /// The close hook runs once the server acknowledges the close.
    pub fn disconnect(&self) {
        self.with_session(|s| s.connection_mut().disconnect());
    }

    /// Sends the registration handshake.
    ///
    /// Returns false if no socket is open.
    pub fn register(&self, registration: &Registration) -> bool {
        self.with_session(|s| s.connection_mut().register(registration))
    }

    /// Sends a raw text frame.
    ///
    /// Returns false unless registered with an open socket.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.with_session(|s| s.connection_mut().send(text))
    }

    /// Runs `f` with the session locked.
    ///
    /// The lock must not be held while bus listeners run; use
    /// [`Self::publish`] after `f` returns.
    pub(crate) fn with_session<R>(&self, f: impl FnOnce(&mut Session<H>) -> R) -> R {
        f(&mut lock(&self.session))
    }

    /// Publishes queued events on the bus.
    pub(crate) fn publish(&self, emitted: Vec<Emitted>) {
        for event in &emitted {
            event.publish_on(&self.bus);
        }
    }

    /// Spawns the message reader task.
    fn spawn_reader(&self, mut source: WsSource, generation: u64) {
        let session = Arc::clone(&self.session);
        let bus = Arc::clone(&self.bus);

        tokio::spawn(async move {
            let publish = |emitted: Vec<Emitted>| {
                for event in &emitted {
                    event.publish_on(&bus);
                }
            };

            let close = loop {
                match source.next().await {
                    Some(Ok(Message::Text(text))) => {
                        let emitted = lock(&session).handle_text(generation, text.as_str());
                        publish(emitted);
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes);
                        let emitted = lock(&session).handle_text(generation, &text);
                        publish(emitted);
                    }
                    Some(Ok(Message::Close(frame))) => break CloseInfo::from(frame),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let err = WsError::from(e);
                        let emitted = lock(&session).handle_error(generation, &err);
                        publish(emitted);
                        break CloseInfo::abnormal();
                    }
                    None => break CloseInfo::abnormal(),
                }
            };

            let emitted = lock(&session).handle_close(generation, &close);
            publish(emitted);
        });
    }
}

/// Spawns the task that drains the outbound queue into the socket.
fn spawn_writer(sink: WsSink, outbound: mpsc::UnboundedReceiver<Message>) {
    tokio::spawn(async move {
        let mut sink = sink;
        let result = UnboundedReceiverStream::new(outbound)
            .map(Ok::<_, tungstenite::Error>)
            .forward(&mut sink)
            .await;
        if let Err(e) = result {
            debug!(error = %e, "websocket writer stopped");
        }
        let _ = sink.close().await;
    });
}

fn lock<H>(session: &Mutex<Session<H>>) -> MutexGuard<'_, Session<H>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
