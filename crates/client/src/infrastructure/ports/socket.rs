//! Socket port: the outbound half of the shared session channel.

use questlog_shared::QuestSocketMessage;

use super::error::TransportError;

/// Sends an envelope to every other connected client.
///
/// Delivery is best effort and the sender never receives its own message.
#[cfg_attr(test, mockall::automock)]
pub trait SocketEmitter: Send + Sync {
    fn emit(&self, message: &QuestSocketMessage) -> Result<(), TransportError>;
}
