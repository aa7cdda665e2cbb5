//! In-process mock of the Miracle realtime endpoints.
//!
//! `/ws/{kind}` acknowledges any `{"user_id": ..}` frame. `match` then pushes
//! a `match_info`; `message` answers chat frames; `kick` closes with 4001.
//! Every text frame the server receives is forwarded to
//! [`MockWsServer::next_frame`].

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use miracle_sdk::bus::listener;
use miracle_sdk::ws::{ClientBus, ClientEvent};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Upper bound for any awaited test step.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Events recorded from a bus, with their names.
pub type EventRx = mpsc::UnboundedReceiver<(&'static str, ClientEvent)>;

#[derive(Clone)]
struct WsState {
    received: mpsc::UnboundedSender<String>,
}

/// A running mock server.
pub struct MockWsServer {
    pub addr: SocketAddr,
    received: mpsc::UnboundedReceiver<String>,
}

impl MockWsServer {
    pub async fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .route("/ws/{kind}", get(ws_handler))
            .with_state(WsState { received: tx });

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self { addr, received: rx }
    }

    /// Returns the base URL, without endpoint path.
    pub fn base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Returns the URL of `/ws/{kind}`.
    pub fn url(&self, kind: &str) -> String {
        format!("ws://{}/ws/{kind}", self.addr)
    }

    /// Waits for the next frame the server received.
    pub async fn next_frame(&mut self) -> String {
        timeout(TIMEOUT, self.received.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("server stopped")
    }

    /// Waits for the next frame and parses it as JSON.
    pub async fn next_json(&mut self) -> Value {
        let frame = self.next_frame().await;
        serde_json::from_str(&frame).expect("frame is json")
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(kind): Path<String>,
    State(state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, kind, state))
}

enum Reply {
    Json(Value),
    Close(u16, &'static str),
}

async fn handle_socket(mut socket: WebSocket, kind: String, state: WsState) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let _ = state.received.send(text.as_str().to_string());

        for reply in respond(&kind, text.as_str()) {
            let message = match reply {
                Reply::Json(value) => Message::Text(value.to_string().into()),
                Reply::Close(code, reason) => Message::Close(Some(CloseFrame {
                    code,
                    reason: reason.into(),
                })),
            };
            if socket.send(message).await.is_err() {
                return;
            }
        }
    }
}

fn respond(kind: &str, text: &str) -> Vec<Reply> {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };

    let Some(kind_of_frame) = value.get("type").and_then(Value::as_str) else {
        let Some(user_id) = value.get("user_id") else {
            return Vec::new();
        };
        let mut replies = vec![Reply::Json(
            json!({"status": "authenticated", "user_id": user_id}),
        )];
        match kind {
            "match" => replies.push(Reply::Json(json!({
                "type": "match_info",
                "match_id": 7,
                "matched_user_id": 99,
                "self_user_id": user_id,
                "match_score": 0.8,
                "reason_of_match_given_to_self_user": "shared interests"
            }))),
            "kick" => replies.push(Reply::Close(4001, "kicked")),
            _ => {}
        }
        return replies;
    };

    match kind_of_frame {
        "private_chat_init" => vec![
            Reply::Json(json!({
                "type": "private_chat_progress",
                "status": "creating",
                "message": "creating chatroom"
            })),
            Reply::Json(json!({
                "type": "private_chat_progress",
                "status": "completed",
                "chatroom_id": 5,
                "message": "chatroom ready"
            })),
        ],
        "private" => vec![Reply::Json(json!({
            "type": "private_message",
            "content": value["content"],
            "sender_id": value["target_user_id"],
            "timestamp": value["timestamp"],
            "chatroom_id": value["chatroom_id"]
        }))],
        "broadcast" => vec![Reply::Json(json!({
            "type": "broadcast",
            "content": value["content"],
            "sender_id": 3,
            "timestamp": value["timestamp"]
        }))],
        _ => Vec::new(),
    }
}

/// Forwards every event in `names` to the returned receiver.
pub fn record(bus: &ClientBus, names: &[&'static str]) -> EventRx {
    let (tx, rx) = mpsc::unbounded_channel();
    for &name in names {
        let tx = tx.clone();
        bus.subscribe(
            name,
            listener(move |event: &ClientEvent| {
                let _ = tx.send((name, event.clone()));
            }),
        );
    }
    rx
}

/// Waits for the next event called `name`, skipping others.
pub async fn next_named(rx: &mut EventRx, name: &str) -> ClientEvent {
    let wait = async {
        loop {
            let (received, event) = rx.recv().await.expect("bus dropped");
            if received == name {
                return event;
            }
        }
    };
    timeout(TIMEOUT, wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
}

/// Polls `check` until it holds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let wait = async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(TIMEOUT, wait).await.expect("condition never held");
}
