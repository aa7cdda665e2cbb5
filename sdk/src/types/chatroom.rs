//! Chatroom management types.

use serde::{Deserialize, Serialize};

use super::ids::{ChatroomId, MatchId, UserId};

/// Request body for fetching or creating the chatroom of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrCreateChatroomRequest {
    /// First user.
    pub user_id_1: UserId,
    /// Second user.
    pub user_id_2: UserId,
    /// Match the chatroom belongs to.
    pub match_id: MatchId,
}

/// Response for fetching or creating a chatroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrCreateChatroomResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Chatroom id.
    pub chatroom_id: Option<ChatroomId>,
}

/// Request body for reading a chatroom's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetChatHistoryRequest {
    /// Chatroom id.
    pub chatroom_id: ChatroomId,
    /// Requesting user.
    pub user_id: UserId,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender display name, or `"I"` for the requesting user.
    pub sender_name: String,
    /// Message text.
    pub message: String,
    /// Send time as formatted by the backend.
    pub datetime: String,
}

impl ChatMessage {
    /// Returns true if the requesting user sent this message.
    #[must_use]
    pub fn is_own(&self) -> bool {
        self.sender_name == "I"
    }
}

/// Response for reading a chatroom's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetChatHistoryResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Messages, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Request body for persisting chatroom history; `None` saves every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveChatroomHistoryRequest {
    /// Chatroom id.
    pub chatroom_id: Option<ChatroomId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_missing_messages() {
        let resp: GetChatHistoryResponse =
            serde_json::from_str(r#"{"success": false}"#).expect("deserialize");
        assert!(!resp.success);
        assert!(resp.messages.is_empty());
    }

    #[test]
    fn test_chat_message_is_own() {
        let msg = ChatMessage {
            sender_name: "I".to_string(),
            message: "hi".to_string(),
            datetime: "2025-01-01 10:00".to_string(),
        };
        assert!(msg.is_own());
    }
}
