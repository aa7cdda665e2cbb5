//! HTTP client for the Miracle REST API.
//!
//! Covers the user, match and chatroom management endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use miracle_sdk::client::{ClientConfig, MiracleClient};
//! use miracle_sdk::{UserId, UserIdRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MiracleClient::new(ClientConfig::default().with_auth_token("token"))?;
//!
//!     let user = client
//!         .get_user_info_with_user_id(&UserIdRequest::from(UserId::new(42)))
//!         .await?;
//!     println!("{} has {} matches", user.telegram_user_name, user.match_ids.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::MiracleClient;
