//! Miracle SDK - Rust client library for the Miracle backend.
//!
//! This crate provides the realtime and REST building blocks used by
//! Miracle clients.
//!
//! # Modules
//!
//! - [`bus`] - In-process publish/subscribe event bus
//! - [`ws`] - WebSocket clients for the base, match and chat endpoints
//! - [`client`] - REST client for user, match and chatroom management
//! - [`types`] - Identifiers and request/response bodies
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use miracle_sdk::bus::listener;
//! use miracle_sdk::ws::{names, ClientBus, ClientEvent};
//!
//! let bus = Arc::new(ClientBus::new());
//! bus.subscribe(
//!     names::MATCH_CLOSE,
//!     listener(|event: &ClientEvent| println!("closed: {event:?}")),
//! );
//! assert_eq!(bus.listener_count(names::MATCH_CLOSE), 1);
//! ```

pub mod bus;
pub mod client;
pub mod error;
pub mod types;
pub mod ws;

pub use bus::{listener, EventBus, Listener};
pub use client::{ClientConfig, ClientError, MiracleClient};
pub use error::SdkError;
pub use types::{
    ChatMessage, ChatroomId, Gender, MatchDetails, MatchId, UserId, UserIdRequest, UserInfo,
};
pub use ws::{
    BaseClient, ChatClient, ChatHandler, ClientBus, ClientEvent, ConnectionState, MatchClient,
    MatchHandler, WsConfig, WsEndpoint, WsError,
};
