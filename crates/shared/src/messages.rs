//! Socket message types for quest log synchronization
//!
//! Every client both sends and receives `QuestSocketMessage` on the single
//! channel named by [`QUEST_SOCKET_CHANNEL`]. The transport delivers to every
//! other connected client, best effort, and never echoes back to the sender.
//!
//! ## Mutation shapes
//!
//! Each mutating kind is one of two shapes (see [`MutationShape`]):
//! - `deletedQuest` announces a fact: the sender already deleted the quest.
//! - `moveQuest` and `questRewardDrop` request application: the first GM
//!   client to process an unhandled request applies it. `handled` tells other
//!   GM clients the work is already done.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use questlog_domain::{QuestId, QuestStatus, RewardId, UserId};

use crate::error::ProtocolError;
use crate::types::{QuestIdSelector, RenderOptions};

/// Event name all quest log traffic is sent under.
pub const QUEST_SOCKET_CHANNEL: &str = "module.questlog";

// =============================================================================
// Envelope
// =============================================================================

/// Envelope exchanged between clients: `{"kind": ..., "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum QuestSocketMessage {
    /// The quest was deleted by the sender; close anything showing it.
    DeletedQuest(DeletedQuestPayload),
    /// Move a quest to another status category.
    MoveQuest(MoveQuestPayload),
    /// Re-render the quest log index views.
    QuestLogRefresh(QuestLogRefreshPayload),
    /// Re-render or close the named quest views.
    QuestPreviewRefresh(QuestPreviewRefreshPayload),
    /// A reward was dragged out of a quest and must be removed.
    QuestRewardDrop(RewardDropPayload),
    /// Open (or focus) a quest view on every client.
    ShowQuestPreview(ShowQuestPreviewPayload),
    /// A user tried to open a quest they cannot observe.
    UserCantOpenQuest(UserCantOpenQuestPayload),
}

impl QuestSocketMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::DeletedQuest(_) => MessageKind::DeletedQuest,
            Self::MoveQuest(_) => MessageKind::MoveQuest,
            Self::QuestLogRefresh(_) => MessageKind::QuestLogRefresh,
            Self::QuestPreviewRefresh(_) => MessageKind::QuestPreviewRefresh,
            Self::QuestRewardDrop(_) => MessageKind::QuestRewardDrop,
            Self::ShowQuestPreview(_) => MessageKind::ShowQuestPreview,
            Self::UserCantOpenQuest(_) => MessageKind::UserCantOpenQuest,
        }
    }

    /// Decode a raw socket value.
    ///
    /// Anything that is not an object with a known `kind` and a matching
    /// payload is rejected.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        if !value.is_object() {
            return Err(ProtocolError::Malformed("envelope is not an object".into()));
        }
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        serde_json::to_value(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

// =============================================================================
// Kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    DeletedQuest,
    MoveQuest,
    QuestLogRefresh,
    QuestPreviewRefresh,
    QuestRewardDrop,
    ShowQuestPreview,
    UserCantOpenQuest,
}

/// How a mutating message relates to the mutation it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationShape {
    /// Already applied by the sender; receivers only reflect it.
    AnnouncesFact,
    /// Not yet applied; the first privileged receiver applies it and marks it handled.
    RequestsApplication,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeletedQuest => "deletedQuest",
            Self::MoveQuest => "moveQuest",
            Self::QuestLogRefresh => "questLogRefresh",
            Self::QuestPreviewRefresh => "questPreviewRefresh",
            Self::QuestRewardDrop => "questRewardDrop",
            Self::ShowQuestPreview => "showQuestPreview",
            Self::UserCantOpenQuest => "userCantOpenQuest",
        }
    }

    /// `None` for kinds that never mutate quest state.
    pub fn mutation_shape(&self) -> Option<MutationShape> {
        match self {
            Self::DeletedQuest => Some(MutationShape::AnnouncesFact),
            Self::MoveQuest | Self::QuestRewardDrop => Some(MutationShape::RequestsApplication),
            Self::QuestLogRefresh
            | Self::QuestPreviewRefresh
            | Self::ShowQuestPreview
            | Self::UserCantOpenQuest => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedQuestPayload {
    pub quest_id: QuestId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveQuestPayload {
    pub quest_id: QuestId,
    /// Set by whichever client already applied the move.
    pub handled: bool,
    pub target: QuestStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLogRefreshPayload {
    #[serde(default)]
    pub options: RenderOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestPreviewRefreshPayload {
    pub quest_id: QuestIdSelector,
    #[serde(default)]
    pub options: RenderOptions,
}

/// The character a claimed reward was dropped onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRef {
    pub id: String,
    pub name: String,
}

/// Who claimed which reward from which quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaim {
    pub quest_id: QuestId,
    pub reward_id: RewardId,
    pub user_id: UserId,
    pub user_name: String,
    pub item_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDropPayload {
    #[serde(default)]
    pub handled: bool,
    pub actor: CharacterRef,
    pub claim: RewardClaim,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowQuestPreviewPayload {
    pub quest_id: QuestId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCantOpenQuestPayload {
    /// Display name of the user who failed to open the quest.
    pub user: String,
}
