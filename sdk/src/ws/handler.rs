//! Client capability hooks.
//!
//! A [`ClientHandler`] is the per-variant behaviour of a WebSocket client.
//! The session calls its hooks after updating the shared [`Connection`]
//! state, so a hook always sees the post-transition state.

use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tracing::{debug, error};

use super::connection::Connection;
use super::error::WsError;
use super::messages::Inbound;

/// Close code when the peer closed without a status (RFC 6455 §7.4.1).
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Close code for an abnormal closure without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Why a socket closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code.
    pub code: u16,
    /// Close reason.
    pub reason: String,
}

impl CloseInfo {
    /// Creates close info.
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Close info for a connection lost without a close handshake.
    #[must_use]
    pub fn abnormal() -> Self {
        Self::new(CLOSE_ABNORMAL, "")
    }
}

impl From<Option<CloseFrame>> for CloseInfo {
    fn from(frame: Option<CloseFrame>) -> Self {
        match frame {
            Some(frame) => Self::new(u16::from(frame.code), frame.reason.as_str()),
            None => Self::new(CLOSE_NO_STATUS, ""),
        }
    }
}

/// Lifecycle hooks of a WebSocket client variant.
///
/// All hooks default to logging only.
pub trait ClientHandler: Send + 'static {
    /// Called once the socket is open.
    fn on_open(&mut self, conn: &mut Connection) {
        debug!(url = conn.url(), "socket open");
    }

    /// Called for every inbound frame.
    fn on_message(&mut self, conn: &mut Connection, inbound: &Inbound) {
        debug!(url = conn.url(), payload = ?inbound.payload, "message received");
    }

    /// Called after the socket closed and the state was reset.
    fn on_close(&mut self, conn: &mut Connection, close: &CloseInfo) {
        debug!(url = conn.url(), code = close.code, reason = %close.reason, "socket closed");
    }

    /// Called after a transport error and the state was reset.
    fn on_error(&mut self, conn: &mut Connection, err: &WsError) {
        error!(url = conn.url(), error = %err, "socket error");
    }
}

/// Handler with only the default hooks, for the `/ws/base` endpoint.
///
/// Registration is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseHandler;

impl ClientHandler for BaseHandler {}

#[cfg(test)]
mod tests {
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    use super::*;

    #[test]
    fn test_close_info_from_frame() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        };
        assert_eq!(CloseInfo::from(Some(frame)), CloseInfo::new(1000, "bye"));
    }

    #[test]
    fn test_close_info_without_frame() {
        assert_eq!(CloseInfo::from(None), CloseInfo::new(CLOSE_NO_STATUS, ""));
        assert_eq!(CloseInfo::abnormal().code, 1006);
    }
}
