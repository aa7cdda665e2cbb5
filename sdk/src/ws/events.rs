//! Events published on the bus by the WebSocket clients.
//!
//! Each client publishes under its own prefix (`match:` or `chat:`); the
//! names are listed in [`names`].

use serde::Serialize;

use super::messages::{ChatDelivery, ChatProgress, MatchInfo, RawPayload};
use crate::bus::EventBus;
use crate::types::{ChatroomId, MatchId, UserId};

/// Bus type shared by all WebSocket clients.
pub type ClientBus = EventBus<ClientEvent>;

/// Event names.
pub mod names {
    /// Match socket opened.
    pub const MATCH_OPEN: &str = "match:open";
    /// Match socket registration acknowledged.
    pub const MATCH_AUTHENTICATED: &str = "match:authenticated";
    /// Any frame received on the match socket.
    pub const MATCH_MESSAGE: &str = "match:message";
    /// A match was found.
    pub const MATCH_SUCCESS: &str = "match:success";
    /// Matching or connection failure.
    pub const MATCH_ERROR: &str = "match:error";
    /// Match socket closed.
    pub const MATCH_CLOSE: &str = "match:close";

    /// Chat socket opened.
    pub const CHAT_OPEN: &str = "chat:open";
    /// Chat socket registration acknowledged.
    pub const CHAT_AUTHENTICATED: &str = "chat:authenticated";
    /// Any frame received on the chat socket.
    pub const CHAT_MESSAGE: &str = "chat:message";
    /// Chatroom setup progress.
    pub const CHAT_PROGRESS: &str = "chat:progress";
    /// Chatroom ready for messages.
    pub const CHAT_ROOM_READY: &str = "chat:room_ready";
    /// Private message received.
    pub const CHAT_PRIVATE_MESSAGE: &str = "chat:private_message";
    /// Broadcast message received.
    pub const CHAT_BROADCAST_MESSAGE: &str = "chat:broadcast_message";
    /// Chat or connection failure.
    pub const CHAT_ERROR: &str = "chat:error";
    /// Chat socket closed.
    pub const CHAT_CLOSE: &str = "chat:close";

    /// Every match event name.
    pub const MATCH_ALL: [&str; 6] = [
        MATCH_OPEN,
        MATCH_AUTHENTICATED,
        MATCH_MESSAGE,
        MATCH_SUCCESS,
        MATCH_ERROR,
        MATCH_CLOSE,
    ];

    /// Every chat event name.
    pub const CHAT_ALL: [&str; 9] = [
        CHAT_OPEN,
        CHAT_AUTHENTICATED,
        CHAT_MESSAGE,
        CHAT_PROGRESS,
        CHAT_ROOM_READY,
        CHAT_PRIVATE_MESSAGE,
        CHAT_BROADCAST_MESSAGE,
        CHAT_ERROR,
        CHAT_CLOSE,
    ];
}

/// Payload of a `match:success` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSuccess {
    /// Match id.
    pub match_id: Option<MatchId>,
    /// This client's user id, when the server echoed it.
    pub self_user_id: Option<UserId>,
    /// The matched user.
    pub matched_user_id: Option<UserId>,
    /// Match score.
    pub match_score: Option<f64>,
    /// Reason shown to this user.
    pub reason_for_self: Option<String>,
    /// Reason shown to the matched user.
    pub reason_for_target: Option<String>,
}

impl From<&MatchInfo> for MatchSuccess {
    fn from(info: &MatchInfo) -> Self {
        Self {
            match_id: info.match_id,
            self_user_id: info.self_user_id,
            matched_user_id: info.matched_user_id,
            match_score: info.match_score,
            reason_for_self: info.reason_of_match_given_to_self_user.clone(),
            reason_for_target: info.reason_of_match_given_to_matched_user.clone(),
        }
    }
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Socket opened and registration sent.
    Open {
        /// The user the client registered as.
        user_id: UserId,
    },
    /// Registration acknowledged.
    Authenticated {
        /// The user the server acknowledged.
        user_id: Option<UserId>,
    },
    /// Any inbound frame.
    Message {
        /// The frame as received.
        payload: RawPayload,
    },
    /// Socket closed.
    Close {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
    /// Transport failure.
    ConnectionError {
        /// Error text.
        error: String,
    },
    /// A match was found.
    MatchSuccess(MatchSuccess),
    /// Matching failed.
    MatchError {
        /// Error text.
        message: Option<String>,
    },
    /// Chatroom setup progress.
    ChatProgress(ChatProgress),
    /// Chatroom ready.
    RoomReady {
        /// The ready chatroom.
        chatroom_id: ChatroomId,
        /// The user the chat was initialised with.
        target_user_id: Option<UserId>,
        /// Progress text.
        message: Option<String>,
    },
    /// Private message received.
    PrivateMessage(ChatDelivery),
    /// Broadcast message received.
    BroadcastMessage(ChatDelivery),
    /// Chat-level failure.
    ChatError {
        /// Error text.
        error: Option<String>,
    },
}

/// An event queued by a handler hook, published once the hook returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    /// Event name.
    pub name: &'static str,
    /// Event payload.
    pub event: ClientEvent,
}

impl Emitted {
    /// Publishes the event on `bus`.
    pub fn publish_on(&self, bus: &ClientBus) {
        bus.publish(self.name, &self.event);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_serialize_tagged() {
        let event = ClientEvent::Close {
            code: 1000,
            reason: "bye".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"event": "close", "code": 1000, "reason": "bye"})
        );
    }

    #[test]
    fn test_match_success_from_info() {
        let info = MatchInfo {
            match_id: Some(MatchId::new(7)),
            matched_user_id: Some(UserId::new(99)),
            self_user_id: None,
            match_score: Some(0.8),
            reason_of_match_given_to_self_user: Some("music".to_string()),
            reason_of_match_given_to_matched_user: None,
        };
        let success = MatchSuccess::from(&info);
        assert_eq!(success.match_id, Some(MatchId::new(7)));
        assert_eq!(success.reason_for_self.as_deref(), Some("music"));
        assert!(success.reason_for_target.is_none());
    }

    #[test]
    fn test_name_prefixes() {
        assert!(names::MATCH_ALL.iter().all(|n| n.starts_with("match:")));
        assert!(names::CHAT_ALL.iter().all(|n| n.starts_with("chat:")));
    }
}
