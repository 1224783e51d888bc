//! Process-local socket hub.
//!
//! Connects every client of an in-process session to one shared channel.
//! An emitted envelope is delivered as raw JSON to every other connection,
//! best effort, and never back to the sender.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use questlog_shared::{QuestSocketMessage, QUEST_SOCKET_CHANNEL};

use super::ports::{SocketEmitter, TransportError};

/// Per-connection inbox capacity. Messages beyond this are dropped.
const CONNECTION_BUFFER: usize = 256;

#[derive(Default)]
pub struct LocalBus {
    connections: DashMap<Uuid, mpsc::Sender<Value>>,
}

impl LocalBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Join the channel. The receiver yields every envelope other clients emit.
    pub fn connect(self: &Arc<Self>) -> (Arc<LocalSocket>, mpsc::Receiver<Value>) {
        let (sender, receiver) = mpsc::channel(CONNECTION_BUFFER);
        let connection_id = Uuid::new_v4();
        self.connections.insert(connection_id, sender);
        tracing::debug!(%connection_id, channel = QUEST_SOCKET_CHANNEL, "Connection registered");

        let socket = Arc::new(LocalSocket {
            connection_id,
            bus: Arc::clone(self),
        });
        (socket, receiver)
    }

    pub fn disconnect(&self, connection_id: Uuid) {
        if self.connections.remove(&connection_id).is_some() {
            tracing::debug!(%connection_id, "Connection unregistered");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Deliver a raw value to everyone except `sender`.
    ///
    /// Also used to inject arbitrary payloads, including malformed ones.
    pub fn broadcast_from(&self, sender: Uuid, value: &Value) {
        for entry in self.connections.iter() {
            if *entry.key() == sender {
                continue;
            }
            if let Err(e) = entry.value().try_send(value.clone()) {
                tracing::warn!(
                    connection_id = %entry.key(),
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }
}

/// One client's handle on the bus.
pub struct LocalSocket {
    connection_id: Uuid,
    bus: Arc<LocalBus>,
}

impl LocalSocket {
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub fn emit_raw(&self, value: &Value) {
        self.bus.broadcast_from(self.connection_id, value);
    }
}

impl SocketEmitter for LocalSocket {
    fn emit(&self, message: &QuestSocketMessage) -> Result<(), TransportError> {
        if !self.bus.connections.contains_key(&self.connection_id) {
            return Err(TransportError::Closed);
        }
        let value = message
            .to_value()
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        tracing::trace!(kind = %message.kind(), "Emitting socket message");
        self.bus.broadcast_from(self.connection_id, &value);
        Ok(())
    }
}
