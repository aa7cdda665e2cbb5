//! Chat client for the `/ws/message` endpoint.
//!
//! Supports private messages within a chatroom, broadcasts, and the
//! `private_chat_init` exchange that allocates a chatroom for a match.

use tracing::{debug, info, warn};

use super::client::WsClient;
use super::connection::{Connection, ConnectionState};
use super::error::WsError;
use super::events::{names, ClientEvent};
use super::handler::{ClientHandler, CloseInfo};
use super::messages::{ClientMessage, Inbound, InboundMessage, Registration};
use crate::types::{ChatroomId, MatchId, UserId};

/// Client for the `/ws/message` endpoint.
pub type ChatClient = WsClient<ChatHandler>;

/// Handler that registers on open and tracks the active chatroom.
#[derive(Debug, Clone)]
pub struct ChatHandler {
    user_id: UserId,
    chatroom_id: Option<ChatroomId>,
    target_user_id: Option<UserId>,
}

impl ChatHandler {
    /// Creates a handler that registers as `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            chatroom_id: None,
            target_user_id: None,
        }
    }

    /// Returns the configured user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the active chatroom.
    #[must_use]
    pub const fn chatroom_id(&self) -> Option<ChatroomId> {
        self.chatroom_id
    }

    /// Returns the current chat partner.
    #[must_use]
    pub const fn target_user_id(&self) -> Option<UserId> {
        self.target_user_id
    }

    /// Forgets the chatroom and partner.
    pub fn reset(&mut self) {
        self.chatroom_id = None;
        self.target_user_id = None;
    }

    /// Sends a private message.
    ///
    /// Uses `chatroom_id` when given, else the active chatroom. Returns false
    /// unless registered with an open socket.
    pub fn send_private(
        &self,
        conn: &mut Connection,
        content: impl Into<String>,
        target_user_id: UserId,
        chatroom_id: Option<ChatroomId>,
    ) -> bool {
        if conn.state() != ConnectionState::Registered {
            warn!(state = %conn.state(), "not registered, private message dropped");
            return false;
        }
        let message =
            ClientMessage::private(content, target_user_id, chatroom_id.or(self.chatroom_id));
        transmit(conn, &message)
    }

    /// Sends a broadcast message.
    ///
    /// Returns false unless registered with an open socket.
    pub fn send_broadcast(&self, conn: &mut Connection, content: impl Into<String>) -> bool {
        transmit(conn, &ClientMessage::broadcast(content))
    }

    /// Asks the server to prepare a chatroom with `target_user_id` for
    /// `match_id`, and remembers the partner.
    pub fn init_private_chat(
        &mut self,
        conn: &mut Connection,
        target_user_id: UserId,
        match_id: MatchId,
    ) -> bool {
        let sent = transmit(
            conn,
            &ClientMessage::private_chat_init(target_user_id, match_id),
        );
        if sent {
            info!(target_user_id = %target_user_id, match_id = %match_id, "private chat requested");
            self.target_user_id = Some(target_user_id);
        }
        sent
    }
}

fn transmit(conn: &mut Connection, message: &ClientMessage) -> bool {
    match message.to_json() {
        Ok(json) => conn.send(json),
        Err(e) => {
            warn!(error = %e, "failed to serialize chat message");
            false
        }
    }
}

impl ClientHandler for ChatHandler {
    fn on_open(&mut self, conn: &mut Connection) {
        info!(user_id = %self.user_id, "chat socket open, registering");
        conn.register(&Registration::new(self.user_id));
        conn.emit(
            names::CHAT_OPEN,
            ClientEvent::Open {
                user_id: self.user_id,
            },
        );
    }

    fn on_message(&mut self, conn: &mut Connection, inbound: &Inbound) {
        match &inbound.message {
            InboundMessage::ChatProgress(progress) => {
                debug!(
                    status = ?progress.status,
                    chatroom_id = ?progress.chatroom_id,
                    "chat progress"
                );
                if let Some(chatroom_id) = progress.ready_chatroom() {
                    info!(chatroom_id = %chatroom_id, "chatroom ready");
                    self.chatroom_id = Some(chatroom_id);
                    conn.emit(
                        names::CHAT_ROOM_READY,
                        ClientEvent::RoomReady {
                            chatroom_id,
                            target_user_id: self.target_user_id,
                            message: progress.message.clone(),
                        },
                    );
                }
                conn.emit(
                    names::CHAT_PROGRESS,
                    ClientEvent::ChatProgress(progress.clone()),
                );
            }
            InboundMessage::PrivateMessage(delivery) => {
                debug!(sender_id = ?delivery.sender_id, "private message received");
                conn.emit(
                    names::CHAT_PRIVATE_MESSAGE,
                    ClientEvent::PrivateMessage(delivery.clone()),
                );
            }
            InboundMessage::BroadcastMessage(delivery) => {
                debug!(sender_id = ?delivery.sender_id, "broadcast message received");
                conn.emit(
                    names::CHAT_BROADCAST_MESSAGE,
                    ClientEvent::BroadcastMessage(delivery.clone()),
                );
            }
            InboundMessage::ChatError { error } => {
                warn!(error = ?error, "private chat error");
                conn.emit(
                    names::CHAT_ERROR,
                    ClientEvent::ChatError {
                        error: error.clone(),
                    },
                );
            }
            InboundMessage::Authenticated { user_id } => {
                debug!(user_id = ?user_id, "chat socket authenticated");
                conn.emit(
                    names::CHAT_AUTHENTICATED,
                    ClientEvent::Authenticated { user_id: *user_id },
                );
            }
            other => debug!(message = ?other, "unhandled chat message"),
        }

        conn.emit(
            names::CHAT_MESSAGE,
            ClientEvent::Message {
                payload: inbound.payload.clone(),
            },
        );
    }

    fn on_close(&mut self, conn: &mut Connection, close: &CloseInfo) {
        debug!(code = close.code, reason = %close.reason, "chat socket closed");
        self.reset();
        conn.emit(
            names::CHAT_CLOSE,
            ClientEvent::Close {
                code: close.code,
                reason: close.reason.clone(),
            },
        );
    }

    fn on_error(&mut self, conn: &mut Connection, err: &WsError) {
        warn!(error = %err, "chat socket error");
        conn.emit(
            names::CHAT_ERROR,
            ClientEvent::ConnectionError {
                error: err.to_string(),
            },
        );
    }
}

/// Point-in-time view of a chat client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatInfo {
    /// Active chatroom.
    pub chatroom_id: Option<ChatroomId>,
    /// Current chat partner.
    pub target_user_id: Option<UserId>,
    /// Registered user.
    pub user_id: Option<UserId>,
    /// Connection state.
    pub state: ConnectionState,
}

impl WsClient<ChatHandler> {
    /// Sends a private message to `target_user_id`.
    ///
    /// Uses `chatroom_id` when given, else the active chatroom. Returns false
    /// unless registered with an open socket.
    pub fn send_private(
        &self,
        content: impl Into<String>,
        target_user_id: UserId,
        chatroom_id: Option<ChatroomId>,
    ) -> bool {
        self.with_session(|s| {
            let (conn, handler) = s.parts_mut();
            handler.send_private(conn, content, target_user_id, chatroom_id)
        })
    }

    /// Sends a broadcast message.
    pub fn send_broadcast(&self, content: impl Into<String>) -> bool {
        self.with_session(|s| {
            let (conn, handler) = s.parts_mut();
            handler.send_broadcast(conn, content)
        })
    }

    /// Asks the server to prepare a chatroom for a match.
    pub fn init_private_chat(&self, target_user_id: UserId, match_id: MatchId) -> bool {
        self.with_session(|s| {
            let (conn, handler) = s.parts_mut();
            handler.init_private_chat(conn, target_user_id, match_id)
        })
    }

    /// Returns the current chat state.
    #[must_use]
    pub fn chat_info(&self) -> ChatInfo {
        self.with_session(|s| ChatInfo {
            chatroom_id: s.handler().chatroom_id(),
            target_user_id: s.handler().target_user_id(),
            user_id: s.connection().user_id(),
            state: s.connection().state(),
        })
    }

    /// Forgets the chatroom and partner.
    pub fn reset_chat(&self) {
        self.with_session(|s| s.parts_mut().1.reset());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::ws::events::Emitted;
    use crate::ws::session::{OpenOutcome, Session};

    type Rx = mpsc::UnboundedReceiver<Message>;

    fn open_session() -> (Session<ChatHandler>, u64, Vec<Emitted>, Rx) {
        let handler = ChatHandler::new(UserId::new(1));
        let mut session = Session::new("ws://localhost/ws/message", handler);
        let generation = session.connection_mut().begin_connect().expect("attempt");
        let (tx, rx) = mpsc::unbounded_channel();
        let OpenOutcome::Attached(emitted) = session.handle_open(generation, tx) else {
            panic!("open abandoned");
        };
        (session, generation, emitted, rx)
    }

    fn registered_session() -> (Session<ChatHandler>, u64, Rx) {
        let (mut session, generation, _, mut rx) = open_session();
        session.handle_text(generation, r#"{"status":"authenticated","user_id":1}"#);
        rx.try_recv().expect("registration frame");
        (session, generation, rx)
    }

    fn sent_json(rx: &mut Rx) -> Value {
        match rx.try_recv().expect("frame") {
            Message::Text(text) => serde_json::from_str(text.as_str()).expect("json"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    fn names_of(emitted: &[Emitted]) -> Vec<&'static str> {
        emitted.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_open_registers_and_publishes() {
        let (_, _, emitted, mut rx) = open_session();
        assert_eq!(names_of(&emitted), vec![names::CHAT_OPEN]);
        assert_eq!(sent_json(&mut rx), json!({"user_id": 1}));
    }

    #[test]
    fn test_send_private_requires_registration() {
        let (mut session, _, _, mut rx) = open_session();
        rx.try_recv().expect("registration frame");

        let (conn, handler) = session.parts_mut();
        assert!(!handler.send_private(conn, "hi", UserId::new(2), None));
        assert!(!handler.send_broadcast(conn, "all"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_private_uses_cached_chatroom() {
        let (mut session, generation, mut rx) = registered_session();
        session.handle_text(
            generation,
            r#"{"type":"private_chat_progress","status":"completed","chatroom_id":5}"#,
        );

        let (conn, handler) = session.parts_mut();
        assert!(handler.send_private(conn, "hi", UserId::new(2), None));
        let sent = sent_json(&mut rx);
        assert_eq!(sent["type"], json!("private"));
        assert_eq!(sent["target_user_id"], json!("2"));
        assert_eq!(sent["content"], json!("hi"));
        assert_eq!(sent["chatroom_id"], json!(5));

        assert!(handler.send_private(conn, "yo", UserId::new(2), Some(ChatroomId::new(8))));
        assert_eq!(sent_json(&mut rx)["chatroom_id"], json!(8));
    }

    #[test]
    fn test_send_broadcast() {
        let (mut session, _, mut rx) = registered_session();
        let (conn, handler) = session.parts_mut();
        assert!(handler.send_broadcast(conn, "hello all"));
        let sent = sent_json(&mut rx);
        assert_eq!(sent["type"], json!("broadcast"));
        assert_eq!(sent["content"], json!("hello all"));
        assert!(sent.get("target_user_id").is_none());
    }

    #[test]
    fn test_init_private_chat_remembers_target() {
        let (mut session, _, mut rx) = registered_session();
        let (conn, handler) = session.parts_mut();
        assert!(handler.init_private_chat(conn, UserId::new(99), MatchId::new(7)));
        assert_eq!(handler.target_user_id(), Some(UserId::new(99)));
        assert_eq!(
            sent_json(&mut rx),
            json!({"type": "private_chat_init", "target_user_id": "99", "match_id": 7})
        );
    }

    #[test]
    fn test_progress_completed_sets_chatroom() {
        let (mut session, generation, _rx) = registered_session();
        let emitted = session.handle_text(
            generation,
            r#"{"type":"private_chat_progress","status":"completed","chatroom_id":5}"#,
        );
        assert_eq!(
            names_of(&emitted),
            vec![names::CHAT_ROOM_READY, names::CHAT_PROGRESS, names::CHAT_MESSAGE]
        );
        assert_eq!(session.handler().chatroom_id(), Some(ChatroomId::new(5)));
    }

    #[test]
    fn test_progress_pending_does_not_set_chatroom() {
        let (mut session, generation, _rx) = registered_session();
        let emitted = session.handle_text(
            generation,
            r#"{"type":"private_chat_progress","status":"creating","chatroom_id":5}"#,
        );
        assert_eq!(names_of(&emitted), vec![names::CHAT_PROGRESS, names::CHAT_MESSAGE]);
        assert!(session.handler().chatroom_id().is_none());
    }

    #[test]
    fn test_inbound_dispatch() {
        let (mut session, generation, _rx) = registered_session();
        let cases = [
            (
                r#"{"type":"private_message","content":"hi","sender_id":2}"#,
                names::CHAT_PRIVATE_MESSAGE,
            ),
            (
                r#"{"type":"broadcast","content":"all","sender_id":3}"#,
                names::CHAT_BROADCAST_MESSAGE,
            ),
            (
                r#"{"type":"private_chat_error","error":"denied"}"#,
                names::CHAT_ERROR,
            ),
        ];
        for (text, expected) in cases {
            let emitted = session.handle_text(generation, text);
            assert_eq!(names_of(&emitted), vec![expected, names::CHAT_MESSAGE]);
        }
    }

    #[test]
    fn test_unknown_type_only_publishes_message() {
        let (mut session, generation, _rx) = registered_session();
        let emitted = session.handle_text(generation, r#"{"type":"typing","user_id":2}"#);
        assert_eq!(names_of(&emitted), vec![names::CHAT_MESSAGE]);
    }

    #[test]
    fn test_close_clears_chat_state() {
        let (mut session, generation, _rx) = registered_session();
        session.handle_text(
            generation,
            r#"{"type":"private_chat_progress","status":"completed","chatroom_id":5}"#,
        );
        let emitted = session.handle_close(generation, &CloseInfo::new(1001, "away"));
        assert_eq!(names_of(&emitted), vec![names::CHAT_CLOSE]);
        assert!(session.handler().chatroom_id().is_none());
        assert!(session.handler().target_user_id().is_none());
    }

    #[test]
    fn test_error_publishes_chat_error() {
        let (mut session, generation, _rx) = registered_session();
        let emitted = session.handle_error(generation, &WsError::Protocol("eof".to_string()));
        assert_eq!(names_of(&emitted), vec![names::CHAT_ERROR]);
    }

    #[test]
    fn test_client_methods_before_connect() {
        let bus = std::sync::Arc::new(crate::ws::events::ClientBus::new());
        let client = ChatClient::new(
            crate::ws::config::WsConfig::default(),
            ChatHandler::new(UserId::new(1)),
            bus,
        )
        .expect("client");

        assert!(!client.send_private("hi", UserId::new(2), None));
        assert!(!client.send_broadcast("hi"));
        assert!(!client.init_private_chat(UserId::new(2), MatchId::new(1)));
        assert_eq!(
            client.chat_info(),
            ChatInfo {
                chatroom_id: None,
                target_user_id: None,
                user_id: None,
                state: ConnectionState::Disconnected,
            }
        );
        client.reset_chat();
    }
}
