//! HTTP client implementation.
//!
//! Provides the main HTTP client for the Miracle REST API. Every endpoint is
//! a JSON `POST`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::ClientConfig;
use super::error::ClientError;
use crate::types::{
    CreateMatchRequest, CreateMatchResponse, CreateNewUserRequest, CreateNewUserResponse,
    EditSummaryRequest, EditTargetGenderRequest, EditUserAgeRequest, GetChatHistoryRequest,
    GetChatHistoryResponse, GetMatchInfoRequest, GetOrCreateChatroomRequest,
    GetOrCreateChatroomResponse, MatchDetails, MatchIdRequest, SaveChatroomHistoryRequest,
    SaveMatchRequest, SuccessResponse, UserIdRequest, UserInfo,
};

/// Endpoint paths.
pub mod paths {
    /// Creates a user.
    pub const CREATE_NEW_USER: &str = "/api/v1/UserManagement/create_new_user";
    /// Edits a user's age.
    pub const EDIT_USER_AGE: &str = "/api/v1/UserManagement/edit_user_age";
    /// Edits a user's target gender.
    pub const EDIT_TARGET_GENDER: &str = "/api/v1/UserManagement/edit_target_gender";
    /// Edits a user's summary.
    pub const EDIT_SUMMARY: &str = "/api/v1/UserManagement/edit_summary";
    /// Persists a user.
    pub const SAVE_USER_INFO: &str = "/api/v1/UserManagement/save_to_database";
    /// Reads a user profile.
    pub const GET_USER_INFO: &str = "/api/v1/UserManagement/get_user_info_with_user_id";
    /// Creates a match.
    pub const CREATE_MATCH: &str = "/api/v1/MatchManager/create_match";
    /// Reads a match.
    pub const GET_MATCH_INFO: &str = "/api/v1/MatchManager/get_match_info";
    /// Toggles the like flag of a match.
    pub const TOGGLE_LIKE: &str = "/api/v1/MatchManager/toggle_like";
    /// Persists matches.
    pub const SAVE_MATCH: &str = "/api/v1/MatchManager/save_to_database";
    /// Fetches or creates a chatroom.
    pub const GET_OR_CREATE_CHATROOM: &str = "/api/v1/ChatroomManager/get_or_create_chatroom";
    /// Reads chat history.
    pub const GET_CHAT_HISTORY: &str = "/api/v1/ChatroomManager/get_chat_history";
    /// Persists chat history.
    pub const SAVE_CHATROOM_HISTORY: &str = "/api/v1/ChatroomManager/save_chatroom_history";
}

/// Error body shape used by the backend.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(alias = "detail", alias = "error")]
    message: String,
}

/// HTTP client for the Miracle REST API.
#[derive(Debug, Clone)]
pub struct MiracleClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl MiracleClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref token) = config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::InvalidConfig("auth_token is not a valid header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { config, http })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(ClientConfig::default())
    }

    /// Creates a new client with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Makes a JSON POST request to the given path.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        debug!(%url, "POST");
        self.request_with_retry(path, || self.http.post(&url).json(body))
            .await
    }

    /// Makes a request with retry logic.
    async fn request_with_retry<T, F>(&self, path: &str, request_fn: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retry_count = 0;

        loop {
            // Only 429 is retried; timeouts surface as `ClientError::Timeout`.
            let resp = request_fn().send().await?;

            let status = resp.status();

            if status.is_success() {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| ClientError::Deserialization(e.to_string()))?;

                return serde_json::from_str(&body)
                    .map_err(|e| ClientError::Deserialization(e.to_string()));
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok());

                if retry_count < self.config.max_retries {
                    let wait_time = retry_after.unwrap_or(1);
                    retry_count += 1;
                    warn!(path, retry_count, wait_time, "rate limited, retrying");
                    tokio::time::sleep(Duration::from_secs(wait_time)).await;
                    continue;
                }

                return Err(ClientError::RateLimited { retry_after });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ClientError::NotFound(path.to_string()));
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized);
            }

            let body = resp.text().await.unwrap_or_default();
            if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(ClientError::Api {
                    code: error_resp
                        .code
                        .unwrap_or_else(|| status.as_str().to_string()),
                    message: error_resp.message,
                });
            }

            return Err(ClientError::Api {
                code: status.as_str().to_string(),
                message: body,
            });
        }
    }

    // User management

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_new_user(
        &self,
        req: &CreateNewUserRequest,
    ) -> Result<CreateNewUserResponse, ClientError> {
        self.post(paths::CREATE_NEW_USER, req).await
    }

    /// Sets a user's age.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn edit_user_age(
        &self,
        req: &EditUserAgeRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::EDIT_USER_AGE, req).await
    }

    /// Sets the gender a user wants to be matched with.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn edit_target_gender(
        &self,
        req: &EditTargetGenderRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::EDIT_TARGET_GENDER, req).await
    }

    /// Sets a user's self description.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn edit_summary(
        &self,
        req: &EditSummaryRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::EDIT_SUMMARY, req).await
    }

    /// Persists a user's cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_user_info_to_database(
        &self,
        req: &UserIdRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::SAVE_USER_INFO, req).await
    }

    /// Reads a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_user_info_with_user_id(
        &self,
        req: &UserIdRequest,
    ) -> Result<UserInfo, ClientError> {
        self.post(paths::GET_USER_INFO, req).await
    }

    // Match management

    /// Creates a match between two users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_match(
        &self,
        req: &CreateMatchRequest,
    ) -> Result<CreateMatchResponse, ClientError> {
        self.post(paths::CREATE_MATCH, req).await
    }

    /// Reads a match from one user's point of view.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_match_info(
        &self,
        req: &GetMatchInfoRequest,
    ) -> Result<MatchDetails, ClientError> {
        self.post(paths::GET_MATCH_INFO, req).await
    }

    /// Toggles the like flag of a match.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn toggle_like(&self, req: &MatchIdRequest) -> Result<SuccessResponse, ClientError> {
        self.post(paths::TOGGLE_LIKE, req).await
    }

    /// Persists one match, or every pending match when no id is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_match_to_database(
        &self,
        req: &SaveMatchRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::SAVE_MATCH, req).await
    }

    // Chatroom management

    /// Fetches the chatroom of a match, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_or_create_chatroom(
        &self,
        req: &GetOrCreateChatroomRequest,
    ) -> Result<GetOrCreateChatroomResponse, ClientError> {
        self.post(paths::GET_OR_CREATE_CHATROOM, req).await
    }

    /// Reads a chatroom's history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_chat_history(
        &self,
        req: &GetChatHistoryRequest,
    ) -> Result<GetChatHistoryResponse, ClientError> {
        self.post(paths::GET_CHAT_HISTORY, req).await
    }

    /// Persists one chatroom's history, or every room when no id is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_chatroom_history(
        &self,
        req: &SaveChatroomHistoryRequest,
    ) -> Result<SuccessResponse, ClientError> {
        self.post(paths::SAVE_CHATROOM_HISTORY, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let config = ClientConfig::new("https://api.example.com");
        assert!(MiracleClient::new(config).is_ok());
    }

    #[test]
    fn test_client_with_defaults() {
        assert!(MiracleClient::with_defaults().is_ok());
    }

    #[test]
    fn test_client_invalid_config() {
        assert!(MiracleClient::new(ClientConfig::new("")).is_err());
    }

    #[test]
    fn test_client_rejects_bad_token() {
        let config = ClientConfig::new("https://api.example.com").with_auth_token("bad\ntoken");
        assert!(matches!(
            MiracleClient::new(config),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_client_config_access() {
        let config = ClientConfig::new("https://api.example.com").with_auth_token("t");
        let client = MiracleClient::new(config).expect("client creation");
        assert_eq!(client.config().base_url, "https://api.example.com");
        assert_eq!(client.config().auth_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_api_error_body_shapes() {
        let resp: ApiErrorResponse =
            serde_json::from_str(r#"{"detail": "user not found"}"#).expect("deserialize");
        assert_eq!(resp.message, "user not found");
        assert!(resp.code.is_none());

        let resp: ApiErrorResponse =
            serde_json::from_str(r#"{"code": "E1", "message": "bad"}"#).expect("deserialize");
        assert_eq!(resp.code.as_deref(), Some("E1"));
    }

    #[test]
    fn test_paths_grouped_by_manager() {
        for path in [
            paths::CREATE_NEW_USER,
            paths::EDIT_USER_AGE,
            paths::EDIT_TARGET_GENDER,
            paths::EDIT_SUMMARY,
            paths::SAVE_USER_INFO,
            paths::GET_USER_INFO,
        ] {
            assert!(path.starts_with("/api/v1/UserManagement/"));
        }
        assert!(paths::SAVE_MATCH.starts_with("/api/v1/MatchManager/"));
        assert!(paths::SAVE_CHATROOM_HISTORY.starts_with("/api/v1/ChatroomManager/"));
    }
}
