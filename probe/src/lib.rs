//! Miracle Probe - command-line client for the Miracle realtime endpoints.
//!
//! Connects one WebSocket client, logs every event it publishes, and in
//! chat mode sends stdin lines as messages.
//!
//! # Components
//!
//! - [`config`]: Environment configuration
//! - [`runner`]: Connection and event loop

pub mod config;
pub mod runner;

pub use config::{ConfigError, ProbeConfig, ProbeMode};
pub use runner::run;
