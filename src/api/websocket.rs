//! WebSocket endpoint for real-time notification delivery.
//!
//! Lifecycle:
//! 1. Client opens `GET /ws` and the connection upgrades immediately.
//! 2. Client sends `{"type": "register", "user_id": "..."}` to bind the
//!    user's room; the server acks with a `registered` message.
//! 3. Notifications created while the user is bound are forwarded as JSON.
//! 4. On disconnect the binding is removed, unless a newer connection has
//!    already taken the room over.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::types::ApiContext;
use crate::notify::{ConnectionRegistry, WsOutgoing};

/// Incoming WebSocket messages, tagged by `type`.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsIncoming {
    Register { user_id: Uuid },
}

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let registry = ctx.registry.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, registry))
}

async fn handle_ws(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, rx) = mpsc::channel::<WsOutgoing>(64);

    // Sender task: channel → WebSocket
    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        let mut rx = rx;
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let conn_id = Uuid::new_v4();
    let mut bound: Option<Uuid> = None;

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(ref text)) => {
                // Anything other than a well-formed register is ignored.
                if let Ok(WsIncoming::Register { user_id }) = serde_json::from_str(text) {
                    if let Some(previous) = bound.take() {
                        registry.unregister(&previous, &conn_id);
                    }
                    registry.register(user_id, conn_id, tx.clone());
                    bound = Some(user_id);
                    let _ = tx.send(WsOutgoing::Registered { user_id }).await;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    // Unbind first: the registry holds its own sender clone, and the sender
    // task only exits once every clone is dropped.
    if let Some(user_id) = bound {
        registry.unregister(&user_id, &conn_id);
    }
    drop(tx);
    let _ = sender_handle.await;
    tracing::debug!(conn_id = %conn_id, "WebSocket disconnected");
}
