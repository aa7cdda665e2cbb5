//! WebSocket configuration.
//!
//! Provides configuration options for the WebSocket clients.

use std::fmt;

use super::error::WsError;

/// Default WebSocket base URL.
pub const DEFAULT_WS_BASE_URL: &str = "wss://lovetapoversea.xyz:4433";

/// WebSocket endpoints exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsEndpoint {
    /// Plain authenticated socket (`/ws/base`).
    Base,
    /// Chat and messaging socket (`/ws/message`).
    Message,
    /// Matching socket (`/ws/match`).
    Match,
}

impl WsEndpoint {
    /// Returns the URL path of the endpoint.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Base => "/ws/base",
            Self::Message => "/ws/message",
            Self::Match => "/ws/match",
        }
    }
}

impl fmt::Display for WsEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// WebSocket configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    /// WebSocket URL.
    pub url: String,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self::for_endpoint(DEFAULT_WS_BASE_URL, WsEndpoint::Base)
    }
}

impl WsConfig {
    /// Creates a new configuration with the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Creates a configuration for `endpoint` under `base_url`.
    ///
    /// A trailing slash on `base_url` is ignored.
    #[must_use]
    pub fn for_endpoint(base_url: &str, endpoint: WsEndpoint) -> Self {
        Self::new(format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            endpoint.path()
        ))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), WsError> {
        if self.url.is_empty() {
            return Err(WsError::InvalidConfig("url cannot be empty".to_string()));
        }

        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(WsError::InvalidConfig(
                "url must start with ws:// or wss://".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WsConfig::default();
        assert_eq!(config.url, "wss://lovetapoversea.xyz:4433/ws/base");
    }

    #[test]
    fn test_config_for_endpoint() {
        let config = WsConfig::for_endpoint("ws://localhost:8000/", WsEndpoint::Match);
        assert_eq!(config.url, "ws://localhost:8000/ws/match");

        let config = WsConfig::for_endpoint("ws://localhost:8000", WsEndpoint::Message);
        assert_eq!(config.url, "ws://localhost:8000/ws/message");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(WsEndpoint::Base.to_string(), "/ws/base");
    }

    #[test]
    fn test_config_validate_valid() {
        assert!(WsConfig::new("wss://example.com/ws").validate().is_ok());
        assert!(WsConfig::new("ws://127.0.0.1:9000/ws").validate().is_ok());
    }

    #[test]
    fn test_config_validate_empty_url() {
        assert!(WsConfig::new("").validate().is_err());
    }

    #[test]
    fn test_config_validate_invalid_scheme() {
        let config = WsConfig::new("https://example.com/ws");
        assert_eq!(
            config.validate(),
            Err(WsError::InvalidConfig(
                "url must start with ws:// or wss://".to_string()
            ))
        );
    }
}
