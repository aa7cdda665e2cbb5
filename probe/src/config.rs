//! Probe configuration.
//!
//! Read from environment variables; see [`ProbeConfig::from_env`].

use std::fmt;
use std::str::FromStr;

use miracle_sdk::client::config::DEFAULT_BASE_URL;
use miracle_sdk::ws::DEFAULT_WS_BASE_URL;
use miracle_sdk::{UserId, WsEndpoint};

/// WebSocket base URL.
pub const ENV_WS_URL: &str = "MIRACLE_WS_URL";
/// REST base URL.
pub const ENV_API_URL: &str = "MIRACLE_API_URL";
/// Client to run: `base`, `match` or `chat`.
pub const ENV_MODE: &str = "PROBE_MODE";
/// User to register as.
pub const ENV_USER_ID: &str = "PROBE_USER_ID";
/// Recipient of private chat messages.
pub const ENV_TARGET_USER_ID: &str = "PROBE_TARGET_USER_ID";
/// Fetch the user's profile over REST at startup.
pub const ENV_FETCH_PROFILE: &str = "PROBE_FETCH_PROFILE";
/// Bearer token for the REST API.
pub const ENV_AUTH_TOKEN: &str = "MIRACLE_AUTH_TOKEN";

/// Which client the probe runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// `/ws/base`, registering explicitly.
    #[default]
    Base,
    /// `/ws/match`.
    Match,
    /// `/ws/message`.
    Chat,
}

impl ProbeMode {
    /// Returns the endpoint the mode connects to.
    #[must_use]
    pub const fn endpoint(self) -> WsEndpoint {
        match self {
            Self::Base => WsEndpoint::Base,
            Self::Match => WsEndpoint::Match,
            Self::Chat => WsEndpoint::Message,
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Match => write!(f, "match"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

impl FromStr for ProbeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "match" => Ok(Self::Match),
            "chat" | "message" => Ok(Self::Chat),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration for the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// WebSocket base URL, without endpoint path.
    pub ws_url: String,

    /// REST base URL.
    pub api_url: String,

    /// Client to run.
    pub mode: ProbeMode,

    /// User to register as.
    pub user_id: Option<UserId>,

    /// Recipient of private chat messages.
    pub target_user_id: Option<UserId>,

    /// Whether to fetch the user's profile at startup.
    pub fetch_profile: bool,

    /// Bearer token for the REST API.
    pub auth_token: Option<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_BASE_URL.to_string(),
            api_url: DEFAULT_BASE_URL.to_string(),
            mode: ProbeMode::default(),
            user_id: None,
            target_user_id: None,
            fetch_profile: false,
            auth_token: None,
        }
    }
}

impl ProbeConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// Unset and empty variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let user_id = get(ENV_USER_ID)
            .map(|v| parse_user_id(ENV_USER_ID, &v))
            .transpose()?;
        let target_user_id = get(ENV_TARGET_USER_ID)
            .map(|v| parse_user_id(ENV_TARGET_USER_ID, &v))
            .transpose()?;
        let fetch_profile = get(ENV_FETCH_PROFILE)
            .map(|v| parse_flag(ENV_FETCH_PROFILE, &v))
            .transpose()?
            .unwrap_or(false);

        let config = Self {
            ws_url: get(ENV_WS_URL).unwrap_or(defaults.ws_url),
            api_url: get(ENV_API_URL).unwrap_or(defaults.api_url),
            mode: get(ENV_MODE)
                .map(|v| v.parse::<ProbeMode>())
                .transpose()?
                .unwrap_or_default(),
            user_id,
            target_user_id,
            fetch_profile,
            auth_token: get(ENV_AUTH_TOKEN),
        };

        config.validate()?;
        Ok(config)
    }

    /// Returns the user id, which every mode needs.
    ///
    /// # Errors
    ///
    /// Returns an error if no user id is configured.
    pub fn require_user_id(&self) -> Result<UserId, ConfigError> {
        self.user_id.ok_or(ConfigError::MissingVar(ENV_USER_ID))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.require_user_id()?;

        if !self.ws_url.starts_with("ws://") && !self.ws_url.starts_with("wss://") {
            return Err(ConfigError::InvalidValue {
                var: ENV_WS_URL,
                value: self.ws_url.clone(),
            });
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: ENV_API_URL,
                value: self.api_url.clone(),
            });
        }

        Ok(())
    }
}

fn parse_user_id(var: &'static str, value: &str) -> Result<UserId, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required variable not set.
    #[error("{0} must be set")]
    MissingVar(&'static str),

    /// Variable holds an invalid value.
    #[error("invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// Unknown probe mode.
    #[error("invalid probe mode: {0} (expected base, match or chat)")]
    InvalidMode(String),
}
