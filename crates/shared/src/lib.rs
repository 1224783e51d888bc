//! Quest Log Protocol - Shared wire types for quest log synchronization
//!
//! Every client of a session talks over one shared socket channel. This crate
//! holds the envelope that travels on it:
//! - `QuestSocketMessage` - the closed set of message kinds, `{kind, payload}` on the wire
//! - Payload structs, one per kind, carrying only their required fields
//! - `QuestIdSelector` - the one-or-many quest id field, normalized at the boundary
//! - `RenderOptions` - opaque options forwarded to view renders
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types and serialization
//! 2. **Closed set of kinds** - adding a kind is a compile-checked change in every dispatcher
//! 3. **No versioning** - all clients of a session are assumed to run the same build;
//!    a payload shape change breaks mixed-version sessions

pub mod error;
pub mod messages;
pub mod types;

pub use error::ProtocolError;
pub use messages::{
    CharacterRef, DeletedQuestPayload, MessageKind, MoveQuestPayload, MutationShape,
    QuestLogRefreshPayload, QuestPreviewRefreshPayload, QuestSocketMessage, RewardClaim,
    RewardDropPayload, ShowQuestPreviewPayload, UserCantOpenQuestPayload, QUEST_SOCKET_CHANNEL,
};
pub use types::{QuestIdSelector, RenderOptions};
