//! WebSocket message types.
//!
//! Outbound messages are typed and serialized with serde. Inbound text is
//! parsed once into a [`RawPayload`] and then decoded into the closed
//! [`InboundMessage`] set that the client handlers dispatch on.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::WsError;
use crate::types::{ChatroomId, MatchId, UserId};

/// Status value the server sends to acknowledge registration.
pub const STATUS_AUTHENTICATED: &str = "authenticated";

/// Progress status that marks a chatroom as ready.
pub const STATUS_COMPLETED: &str = "completed";

/// Registration handshake body: `{"user_id": ...}`.
///
/// Deserialization accepts `userId` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// The user announcing itself.
    #[serde(alias = "userId")]
    pub user_id: UserId,
}

impl Registration {
    /// Creates a registration for `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl From<UserId> for Registration {
    fn from(user_id: UserId) -> Self {
        Self::new(user_id)
    }
}

/// Returns the current time as an ISO-8601 UTC timestamp with milliseconds.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Client-to-server messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Private message to one user.
    Private {
        /// Recipient, as a string.
        target_user_id: String,
        /// Message text.
        content: String,
        /// ISO-8601 send time.
        timestamp: String,
        /// Chatroom the message belongs to.
        #[serde(skip_serializing_if = "Option::is_none")]
        chatroom_id: Option<ChatroomId>,
    },
    /// Message to every connected user.
    Broadcast {
        /// Message text.
        content: String,
        /// ISO-8601 send time.
        timestamp: String,
    },
    /// Asks the server to prepare a private chatroom for a match.
    PrivateChatInit {
        /// The other user, as a string.
        target_user_id: String,
        /// Match the chat belongs to.
        match_id: MatchId,
    },
}

impl ClientMessage {
    /// Creates a private message stamped with the current time.
    #[must_use]
    pub fn private(
        content: impl Into<String>,
        target_user_id: UserId,
        chatroom_id: Option<ChatroomId>,
    ) -> Self {
        Self::Private {
            target_user_id: target_user_id.to_string(),
            content: content.into(),
            timestamp: timestamp_now(),
            chatroom_id,
        }
    }

    /// Creates a broadcast message stamped with the current time.
    #[must_use]
    pub fn broadcast(content: impl Into<String>) -> Self {
        Self::Broadcast {
            content: content.into(),
            timestamp: timestamp_now(),
        }
    }

    /// Creates a private chat initialisation request.
    #[must_use]
    pub fn private_chat_init(target_user_id: UserId, match_id: MatchId) -> Self {
        Self::PrivateChatInit {
            target_user_id: target_user_id.to_string(),
            match_id,
        }
    }

    /// Serializes the message to JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, WsError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// An inbound frame as received: parsed JSON, or the raw text when the frame
/// is not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawPayload {
    /// Valid JSON.
    Json(Value),
    /// Anything else, passed through untouched.
    Text(String),
}

impl RawPayload {
    /// Parses `text`, degrading to [`RawPayload::Text`] on invalid JSON.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text.to_string()),
        }
    }

    /// Returns the JSON value, if any.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns a top-level string field.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_json()?.get(key)?.as_str()
    }

    /// Returns the `type` discriminator.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Returns the `status` discriminator.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// Returns true for a registration acknowledgement.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == Some(STATUS_AUTHENTICATED)
    }

    /// Returns the `user_id` field when it decodes as a [`UserId`].
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        let value = self.as_json()?.get("user_id")?;
        UserId::deserialize(value).ok()
    }
}

/// Match result pushed by the matching service.
///
/// Every field is optional; a `match_info` frame is a match result whatever
/// it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Match id.
    #[serde(default)]
    pub match_id: Option<MatchId>,
    /// The user this client was matched with.
    #[serde(default)]
    pub matched_user_id: Option<UserId>,
    /// This client's user id, when echoed.
    #[serde(default)]
    pub self_user_id: Option<UserId>,
    /// Match score.
    #[serde(default)]
    pub match_score: Option<f64>,
    /// Reason shown to this user.
    #[serde(default)]
    pub reason_of_match_given_to_self_user: Option<String>,
    /// Reason shown to the matched user.
    #[serde(default)]
    pub reason_of_match_given_to_matched_user: Option<String>,
}

/// Progress of a private chatroom setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatProgress {
    /// Progress status; `completed` once the room is ready.
    #[serde(default)]
    pub status: Option<String>,
    /// Chatroom id, present once allocated.
    #[serde(default)]
    pub chatroom_id: Option<ChatroomId>,
    /// Human readable progress text.
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatProgress {
    /// Returns the chatroom id if setup has completed.
    #[must_use]
    pub fn ready_chatroom(&self) -> Option<ChatroomId> {
        if self.status.as_deref() == Some(STATUS_COMPLETED) {
            self.chatroom_id
        } else {
            None
        }
    }
}

/// A delivered private or broadcast chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDelivery {
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// Sender.
    #[serde(default)]
    pub sender_id: Option<UserId>,
    /// Send time as provided by the sender.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Chatroom, for private messages.
    #[serde(default)]
    pub chatroom_id: Option<ChatroomId>,
}

/// Inbound messages that carry a `type` discriminator.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TypedMessage {
    MatchInfo(MatchInfo),
    MatchError {
        #[serde(default)]
        message: Option<String>,
    },
    PrivateChatProgress(ChatProgress),
    #[serde(alias = "private_message")]
    Private(ChatDelivery),
    Broadcast(ChatDelivery),
    PrivateChatError {
        #[serde(default)]
        error: Option<String>,
    },
}

/// Server-to-client messages, decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Registration acknowledgement.
    Authenticated {
        /// The registered user.
        user_id: Option<UserId>,
    },
    /// A match was found.
    MatchInfo(MatchInfo),
    /// Matching failed.
    MatchError {
        /// Error text.
        message: Option<String>,
    },
    /// Chatroom setup progress.
    ChatProgress(ChatProgress),
    /// Private message (`private` or `private_message`).
    PrivateMessage(ChatDelivery),
    /// Broadcast message.
    BroadcastMessage(ChatDelivery),
    /// Chat-level error.
    ChatError {
        /// Error text.
        error: Option<String>,
    },
    /// Anything else, including non-JSON frames.
    Unrecognized,
}

impl InboundMessage {
    /// Decodes a raw payload.
    ///
    /// The `type` field wins; payloads without a known type are an
    /// acknowledgement when `status` is `authenticated` and unrecognized
    /// otherwise. A known type with a malformed body is unrecognized.
    #[must_use]
    pub fn decode(payload: &RawPayload) -> Self {
        let Some(value) = payload.as_json() else {
            return Self::Unrecognized;
        };

        if value.get("type").is_some() {
            match TypedMessage::deserialize(value) {
                Ok(typed) => return typed.into(),
                Err(e) => debug!(error = %e, "inbound message did not match a known type"),
            }
        }

        if payload.is_authenticated() {
            return Self::Authenticated {
                user_id: payload.user_id(),
            };
        }

        Self::Unrecognized
    }
}

impl From<TypedMessage> for InboundMessage {
    fn from(typed: TypedMessage) -> Self {
        match typed {
            TypedMessage::MatchInfo(info) => Self::MatchInfo(info),
            TypedMessage::MatchError { message } => Self::MatchError { message },
            TypedMessage::PrivateChatProgress(progress) => Self::ChatProgress(progress),
            TypedMessage::Private(delivery) => Self::PrivateMessage(delivery),
            TypedMessage::Broadcast(delivery) => Self::BroadcastMessage(delivery),
            TypedMessage::PrivateChatError { error } => Self::ChatError { error },
        }
    }
}

/// An inbound frame together with its decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    /// The frame as received.
    pub payload: RawPayload,
    /// The typed decoding.
    pub message: InboundMessage,
}

impl Inbound {
    /// Parses and decodes inbound text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let payload = RawPayload::parse(text);
        let message = InboundMessage::decode(&payload);
        Self { payload, message }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_registration_serialize() {
        let json = serde_json::to_string(&Registration::new(UserId::new(42))).expect("serialize");
        assert_eq!(json, r#"{"user_id":42}"#);
    }

    #[test]
    fn test_registration_accepts_camel_case() {
        let reg: Registration = serde_json::from_str(r#"{"userId": 7}"#).expect("deserialize");
        assert_eq!(reg.user_id, UserId::new(7));
        let reg: Registration = serde_json::from_str(r#"{"user_id": 8}"#).expect("deserialize");
        assert_eq!(reg.user_id, UserId::new(8));
    }

    #[test]
    fn test_private_message_serialize() {
        let msg = ClientMessage::Private {
            target_user_id: "99".to_string(),
            content: "hi".to_string(),
            timestamp: "2025-01-01T00:00:00.000Z".to_string(),
            chatroom_id: Some(ChatroomId::new(5)),
        };
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "private",
                "target_user_id": "99",
                "content": "hi",
                "timestamp": "2025-01-01T00:00:00.000Z",
                "chatroom_id": 5
            })
        );
    }

    #[test]
    fn test_private_message_omits_missing_chatroom() {
        let msg = ClientMessage::private("hi", UserId::new(3), None);
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value["target_user_id"], json!("3"));
        assert!(value.get("chatroom_id").is_none());
    }

    #[test]
    fn test_broadcast_serialize() {
        let value = serde_json::to_value(ClientMessage::broadcast("hello")).expect("serialize");
        assert_eq!(value["type"], json!("broadcast"));
        assert_eq!(value["content"], json!("hello"));
        assert!(value["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    }

    #[test]
    fn test_private_chat_init_serialize() {
        let msg = ClientMessage::private_chat_init(UserId::new(99), MatchId::new(7));
        let json = msg.to_json().expect("serialize");
        assert_eq!(
            json,
            r#"{"type":"private_chat_init","target_user_id":"99","match_id":7}"#
        );
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn test_raw_payload_opaque_text() {
        let payload = RawPayload::parse("not json {");
        assert_eq!(payload, RawPayload::Text("not json {".to_string()));
        assert!(payload.status().is_none());
        assert_eq!(InboundMessage::decode(&payload), InboundMessage::Unrecognized);
    }

    #[test]
    fn test_decode_authenticated() {
        let inbound = Inbound::parse(r#"{"status":"authenticated","user_id":42}"#);
        assert_eq!(
            inbound.message,
            InboundMessage::Authenticated {
                user_id: Some(UserId::new(42))
            }
        );
    }

    #[test]
    fn test_decode_match_info() {
        let inbound = Inbound::parse(
            r#"{"type":"match_info","match_id":7,"matched_user_id":99,"match_score":0.8}"#,
        );
        match inbound.message {
            InboundMessage::MatchInfo(info) => {
                assert_eq!(info.match_id, Some(MatchId::new(7)));
                assert_eq!(info.matched_user_id, Some(UserId::new(99)));
                assert_eq!(info.match_score, Some(0.8));
                assert!(info.reason_of_match_given_to_self_user.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_private_message_alias() {
        for kind in ["private", "private_message"] {
            let text = json!({
                "type": kind,
                "content": "hey",
                "sender_id": 2,
                "timestamp": "t",
                "chatroom_id": 5
            })
            .to_string();
            match Inbound::parse(&text).message {
                InboundMessage::PrivateMessage(delivery) => {
                    assert_eq!(delivery.content, "hey");
                    assert_eq!(delivery.sender_id, Some(UserId::new(2)));
                    assert_eq!(delivery.chatroom_id, Some(ChatroomId::new(5)));
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_progress() {
        let inbound = Inbound::parse(
            r#"{"type":"private_chat_progress","status":"completed","chatroom_id":5}"#,
        );
        match inbound.message {
            InboundMessage::ChatProgress(progress) => {
                assert_eq!(progress.ready_chatroom(), Some(ChatroomId::new(5)));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_progress_not_ready_until_completed() {
        let progress = ChatProgress {
            status: Some("creating".to_string()),
            chatroom_id: Some(ChatroomId::new(5)),
            message: None,
        };
        assert!(progress.ready_chatroom().is_none());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            Inbound::parse(r#"{"type":"match_error","message":"no candidates"}"#).message,
            InboundMessage::MatchError {
                message: Some("no candidates".to_string())
            }
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"private_chat_error","error":"denied"}"#).message,
            InboundMessage::ChatError {
                error: Some("denied".to_string())
            }
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let inbound = Inbound::parse(r#"{"type":"user_joined","user_id":3}"#);
        assert_eq!(inbound.message, InboundMessage::Unrecognized);
    }

    #[test]
    fn test_decode_unknown_type_with_authenticated_status() {
        let inbound = Inbound::parse(r#"{"type":"hello","status":"authenticated","user_id":1}"#);
        assert_eq!(
            inbound.message,
            InboundMessage::Authenticated {
                user_id: Some(UserId::new(1))
            }
        );
    }

    #[test]
    fn test_decode_malformed_match_info() {
        let inbound = Inbound::parse(r#"{"type":"match_info","match_score":0.5}"#);
        assert_eq!(inbound.message, InboundMessage::Unrecognized);
    }
}
