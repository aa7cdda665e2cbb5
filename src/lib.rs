//! Miracle - Rust client for the Miracle matching and chat backend.
//!
//! This crate re-exports [`miracle_sdk`], which holds the event bus, the
//! WebSocket clients and the REST client.

pub use miracle_sdk::*;
