//! Matching client for the `/ws/match` endpoint.
//!
//! The backend starts matching as soon as the registration is acknowledged
//! and pushes a `match_info` frame once a partner is found.

use tracing::{debug, info, warn};

use super::client::WsClient;
use super::connection::{Connection, ConnectionState};
use super::error::WsError;
use super::events::{names, ClientEvent, MatchSuccess};
use super::handler::{ClientHandler, CloseInfo};
use super::messages::{Inbound, InboundMessage, Registration};
use crate::types::{MatchId, UserId};

/// Client for the `/ws/match` endpoint.
pub type MatchClient = WsClient<MatchHandler>;

/// Handler that registers on open and tracks the latest match.
#[derive(Debug, Clone)]
pub struct MatchHandler {
    user_id: UserId,
    match_id: Option<MatchId>,
    target_user_id: Option<UserId>,
}

impl MatchHandler {
    /// Creates a handler that registers as `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            match_id: None,
            target_user_id: None,
        }
    }

    /// Returns the configured user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the last match id.
    #[must_use]
    pub const fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    /// Returns the last matched user.
    #[must_use]
    pub const fn target_user_id(&self) -> Option<UserId> {
        self.target_user_id
    }

    /// Forgets the last match.
    pub fn reset(&mut self) {
        self.match_id = None;
        self.target_user_id = None;
    }
}

impl ClientHandler for MatchHandler {
    fn on_open(&mut self, conn: &mut Connection) {
        info!(user_id = %self.user_id, "match socket open, registering");
        conn.register(&Registration::new(self.user_id));
        conn.emit(
            names::MATCH_OPEN,
            ClientEvent::Open {
                user_id: self.user_id,
            },
        );
    }

    fn on_message(&mut self, conn: &mut Connection, inbound: &Inbound) {
        match &inbound.message {
            InboundMessage::MatchInfo(match_info) => {
                info!(
                    match_id = ?match_info.match_id,
                    matched_user_id = ?match_info.matched_user_id,
                    score = ?match_info.match_score,
                    "match found"
                );
                self.match_id = match_info.match_id;
                self.target_user_id = match_info.matched_user_id;
                conn.emit(
                    names::MATCH_SUCCESS,
                    ClientEvent::MatchSuccess(MatchSuccess::from(match_info)),
                );
            }
            InboundMessage::MatchError { message } => {
                warn!(message = ?message, "matching failed");
                conn.emit(
                    names::MATCH_ERROR,
                    ClientEvent::MatchError {
                        message: message.clone(),
                    },
                );
            }
            InboundMessage::Authenticated { user_id } => {
                debug!(user_id = ?user_id, "match socket authenticated");
                conn.emit(
                    names::MATCH_AUTHENTICATED,
                    ClientEvent::Authenticated { user_id: *user_id },
                );
            }
            other => debug!(message = ?other, "unhandled match message"),
        }

        conn.emit(
            names::MATCH_MESSAGE,
            ClientEvent::Message {
                payload: inbound.payload.clone(),
            },
        );
    }

    fn on_close(&mut self, conn: &mut Connection, close: &CloseInfo) {
        debug!(code = close.code, reason = %close.reason, "match socket closed");
        self.reset();
        conn.emit(
            names::MATCH_CLOSE,
            ClientEvent::Close {
                code: close.code,
                reason: close.reason.clone(),
            },
        );
    }

    fn on_error(&mut self, conn: &mut Connection, err: &WsError) {
        warn!(error = %err, "match socket error");
        conn.emit(
            names::MATCH_ERROR,
            ClientEvent::ConnectionError {
                error: err.to_string(),
            },
        );
    }
}

/// Point-in-time view of a matching client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInfoSnapshot {
    /// Last match id.
    pub match_id: Option<MatchId>,
    /// Last matched user.
    pub target_user_id: Option<UserId>,
    /// Registered user.
    pub user_id: Option<UserId>,
    /// Connection state.
    pub state: ConnectionState,
}

impl WsClient<MatchHandler> {
    /// Checks that matching can proceed.
    ///
    /// Matching starts on the server once registration is acknowledged, so
    /// this only reports whether the client is ready.
    pub fn start_match(&self) -> bool {
        if !self.is_ready() {
            warn!("match client not ready, cannot start matching");
            return false;
        }
        debug!("matching in progress on server");
        true
    }

    /// Returns the current match state.
    #[must_use]
    pub fn match_info(&self) -> MatchInfoSnapshot {
        self.with_session(|s| MatchInfoSnapshot {
            match_id: s.handler().match_id(),
            target_user_id: s.handler().target_user_id(),
            user_id: s.connection().user_id(),
            state: s.connection().state(),
        })
    }

    /// Forgets the last match.
    pub fn reset_match(&self) {
        self.with_session(|s| s.parts_mut().1.reset());
    }
}
