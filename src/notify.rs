//! Real-time notification delivery over WebSocket.
//!
//! Each connected user holds at most one live room. Registering a newer
//! connection for the same user replaces the previous one, and a stale
//! connection unregistering after being replaced leaves the newer one
//! intact (the unregister is a no-op unless that connection still owns
//! the room).

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::Notification;

/// Outgoing WebSocket messages, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsOutgoing {
    /// Acknowledges a `register` message; the connection now owns the
    /// user's room.
    Registered { user_id: Uuid },
    /// A notification pushed to the user in real time.
    Notification { notification: Notification },
}

struct ConnectionEntry {
    conn_id: Uuid,
    sender: mpsc::Sender<WsOutgoing>,
}

/// Maps user ids to their single live WebSocket sender.
#[derive(Default)]
pub struct ConnectionRegistry {
    rooms: Mutex<HashMap<Uuid, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to a user's room. Last write wins: any earlier
    /// connection for the same user is dropped from the registry (its
    /// socket task will find itself unregistered and exit).
    pub fn register(&self, user_id: Uuid, conn_id: Uuid, sender: mpsc::Sender<WsOutgoing>) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms.insert(user_id, ConnectionEntry { conn_id, sender });
        tracing::debug!(user_id = %user_id, conn_id = %conn_id, "WebSocket registered");
    }

    /// Remove a connection from a user's room, but only if that exact
    /// connection still owns it. A connection that was already replaced
    /// must not evict its successor on the way out.
    pub fn unregister(&self, user_id: &Uuid, conn_id: &Uuid) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        if rooms.get(user_id).is_some_and(|e| e.conn_id == *conn_id) {
            rooms.remove(user_id);
            tracing::debug!(user_id = %user_id, conn_id = %conn_id, "WebSocket unregistered");
        }
    }

    /// Sender for the user's live connection, if any.
    pub fn lookup(&self, user_id: &Uuid) -> Option<mpsc::Sender<WsOutgoing>> {
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms.get(user_id).map(|e| e.sender.clone())
    }

    /// Push a notification to the user if they are connected. Offline
    /// users are skipped silently; the row is already persisted and will
    /// be fetched on their next poll.
    pub async fn push(&self, user_id: &Uuid, notification: Notification) {
        if let Some(sender) = self.lookup(user_id) {
            let _ = sender.send(WsOutgoing::Notification { notification }).await;
        }
    }
}
