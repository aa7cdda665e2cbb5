//! WebSocket clients for the Miracle realtime endpoints.
//!
//! Every client is a [`WsClient`] over a [`ClientHandler`] variant:
//! [`BaseHandler`] for `/ws/base`, [`MatchHandler`] for `/ws/match` and
//! [`ChatHandler`] for `/ws/message`. Clients publish their events on an
//! injected [`ClientBus`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use miracle_sdk::ws::{names, ClientBus, MatchClient, MatchHandler, WsConfig, WsEndpoint};
//! use miracle_sdk::{bus::listener, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(ClientBus::new());
//!     bus.subscribe(names::MATCH_SUCCESS, listener(|event| println!("{event:?}")));
//!
//!     let config = WsConfig::for_endpoint("wss://lovetapoversea.xyz:4433", WsEndpoint::Match);
//!     let client = MatchClient::new(config, MatchHandler::new(UserId::new(42)), bus)?;
//!     client.connect().await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod handler;
pub mod matching;
pub mod messages;
pub mod session;

pub use chat::{ChatClient, ChatHandler, ChatInfo};
pub use client::{BaseClient, WsClient};
pub use config::{WsConfig, WsEndpoint, DEFAULT_WS_BASE_URL};
pub use connection::{Connection, ConnectionState};
pub use error::WsError;
pub use events::{names, ClientBus, ClientEvent, Emitted, MatchSuccess};
pub use handler::{BaseHandler, ClientHandler, CloseInfo};
pub use matching::{MatchClient, MatchHandler, MatchInfoSnapshot};
pub use messages::{
    ChatDelivery, ChatProgress, ClientMessage, Inbound, InboundMessage, MatchInfo, RawPayload,
    Registration,
};
