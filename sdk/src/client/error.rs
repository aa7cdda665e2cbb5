//! Client error types.

use thiserror::Error;

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Failed to deserialize response.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// API returned an error response.
    #[error("API error [{code}]: {message}")]
    Api {
        /// HTTP status or backend error code.
        code: String,
        /// Error message.
        message: String,
    },

    /// Rate limited (429) and out of retries.
    #[error("rate limited{}", retry_hint(*retry_after))]
    RateLimited {
        /// Retry after seconds.
        retry_after: Option<u64>,
    },

    /// Endpoint or resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized")]
    Unauthorized,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,
}

fn retry_hint(retry_after: Option<u64>) -> String {
    retry_after
        .map(|s| format!(", retry after {s} seconds"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}
