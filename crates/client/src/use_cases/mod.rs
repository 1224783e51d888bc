//! Use cases - quest log synchronization.
//!
//! - `authority` decides who applies a mutation
//! - `refresh` re-renders or closes the views a mutation touched
//! - `quest_socket` holds the outgoing operations a UI action triggers

pub mod authority;
pub mod error;
pub mod quest_socket;
pub mod refresh;

pub use error::SyncError;
pub use quest_socket::{DeletedQuestNotice, MoveOutcome, OpenOutcome, QuestSocket, RewardDropOutcome};
pub use refresh::{RefreshBroadcaster, RefreshReport};

use questlog_shared::QuestSocketMessage;

use crate::infrastructure::ports::SocketEmitter;

/// Fire-and-forget emit. Transport failures are logged, never returned.
pub(crate) fn emit(socket: &dyn SocketEmitter, message: QuestSocketMessage) {
    if let Err(e) = socket.emit(&message) {
        tracing::warn!(kind = %message.kind(), error = %e, "Failed to emit socket message");
    }
}
