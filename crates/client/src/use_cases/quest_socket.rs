//! Outgoing quest log operations.
//!
//! Each method is what a UI action on this client triggers: it consults the
//! authority rules, applies what this client is allowed to apply, and tells
//! the other clients about it.

use std::sync::Arc;

use questlog_domain::{Actor, Quest, QuestId, QuestStatus};
use questlog_shared::{
    CharacterRef, DeletedQuestPayload, MoveQuestPayload, QuestSocketMessage, RenderOptions,
    RewardClaim, RewardDropPayload, ShowQuestPreviewPayload, UserCantOpenQuestPayload,
};

use super::authority::{self, MoveDecision};
use super::refresh::{RefreshBroadcaster, RefreshReport};
use super::{emit, SyncError};
use crate::infrastructure::ports::{
    CloseOptions, Notification, NotificationSink, NotifyLevel, QuestDirectory, SocketEmitter,
    ViewHandle, ViewRegistry,
};
use crate::infrastructure::settings::SharedSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Applied here and broadcast as handled.
    Applied,
    /// Broadcast unhandled for a GM client to apply.
    Requested,
    /// Not allowed; nothing was sent.
    Refused,
    /// The quest disappeared before the move could be applied.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardDropOutcome {
    /// This client removed the reward (or found it already gone).
    Handled,
    /// Broadcast unhandled for a GM client to remove.
    Requested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened(ViewHandle),
    NotFound,
    NotObservable,
}

/// A quest this client has already deleted.
///
/// `saved_ids` are the quests whose parent or subquest links were rewritten
/// by the delete and therefore need a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedQuestNotice {
    pub quest_id: QuestId,
    pub saved_ids: Vec<QuestId>,
}

pub struct QuestSocket {
    actor: Actor,
    settings: SharedSettings,
    directory: Arc<dyn QuestDirectory>,
    views: Arc<dyn ViewRegistry>,
    notifier: Arc<dyn NotificationSink>,
    socket: Arc<dyn SocketEmitter>,
    refresh: Arc<RefreshBroadcaster>,
}

impl QuestSocket {
    pub fn new(
        actor: Actor,
        settings: SharedSettings,
        directory: Arc<dyn QuestDirectory>,
        views: Arc<dyn ViewRegistry>,
        notifier: Arc<dyn NotificationSink>,
        socket: Arc<dyn SocketEmitter>,
        refresh: Arc<RefreshBroadcaster>,
    ) -> Self {
        Self {
            actor,
            settings,
            directory,
            views,
            notifier,
            socket,
            refresh,
        }
    }

    /// Move `quest` to `target`, or ask a GM client to.
    pub async fn move_quest(
        &self,
        quest: &Quest,
        target: QuestStatus,
    ) -> Result<MoveOutcome, SyncError> {
        let settings = *self.settings.read().await;
        let decision =
            authority::resolve_move(&self.actor, quest.is_owner(&self.actor), target, &settings);

        let handled = match decision {
            MoveDecision::ApplyLocally => {
                if self.apply_move(&quest.id, target).await?.is_none() {
                    return Ok(MoveOutcome::NotFound);
                }
                true
            }
            MoveDecision::RequestPrivileged => false,
            MoveDecision::Refuse => {
                tracing::debug!(quest_id = %quest.id, %target, "Move refused");
                return Ok(MoveOutcome::Refused);
            }
        };

        emit(
            self.socket.as_ref(),
            QuestSocketMessage::MoveQuest(MoveQuestPayload {
                quest_id: quest.id.clone(),
                handled,
                target,
            }),
        );

        Ok(if handled {
            MoveOutcome::Applied
        } else {
            MoveOutcome::Requested
        })
    }

    /// Apply a move to the stored quest and refresh its group everywhere.
    ///
    /// Returns `None` when the quest is not in the directory.
    pub async fn apply_move(
        &self,
        quest_id: &QuestId,
        target: QuestStatus,
    ) -> Result<Option<Quest>, SyncError> {
        let Some(mut quest) = self.directory.get(quest_id).await? else {
            tracing::debug!(%quest_id, "Move target quest not found");
            return Ok(None);
        };

        if quest.apply_move(target) {
            self.directory.save(&quest).await?;
            tracing::info!(%quest_id, %target, "Quest moved");
        }

        self.refresh.refresh_group(&quest).await?;
        self.notifier
            .notify(NotifyLevel::Info, Notification::QuestMoved { target });
        Ok(Some(quest))
    }

    /// Report a reward claimed by dragging it onto a character.
    pub async fn quest_reward_drop(
        &self,
        actor: CharacterRef,
        claim: RewardClaim,
    ) -> Result<RewardDropOutcome, SyncError> {
        let handled = authority::resolve_reward_drop(&self.actor);
        if handled {
            self.remove_claimed_reward(&claim).await?;
        }

        emit(
            self.socket.as_ref(),
            QuestSocketMessage::QuestRewardDrop(RewardDropPayload {
                handled,
                actor,
                claim,
            }),
        );

        Ok(if handled {
            RewardDropOutcome::Handled
        } else {
            RewardDropOutcome::Requested
        })
    }

    /// Remove a claimed reward and refresh the quest everywhere.
    ///
    /// Removing a reward that is already gone changes nothing and saves
    /// nothing. Returns whether a reward was removed.
    pub async fn remove_claimed_reward(&self, claim: &RewardClaim) -> Result<bool, SyncError> {
        let Some(mut quest) = self.directory.get(&claim.quest_id).await? else {
            tracing::debug!(quest_id = %claim.quest_id, "Reward quest not found");
            return Ok(false);
        };

        let removed = quest.remove_reward(&claim.reward_id);
        if removed {
            self.directory.save(&quest).await?;
            tracing::info!(
                quest_id = %quest.id,
                reward_id = %claim.reward_id,
                user = %claim.user_name,
                "Claimed reward removed"
            );
        }

        self.refresh.refresh_quest_preview_one(quest.id).await?;
        Ok(removed)
    }

    /// Announce a delete this client already performed.
    pub async fn deleted_quest(&self, notice: DeletedQuestNotice) -> Result<(), SyncError> {
        if let Some(view) = self.views.get(&notice.quest_id) {
            if let Err(e) = self.views.close(&view, CloseOptions::no_save()).await {
                tracing::warn!(quest_id = %notice.quest_id, error = %e, "Failed to close deleted quest view");
            }
        }

        emit(
            self.socket.as_ref(),
            QuestSocketMessage::DeletedQuest(DeletedQuestPayload {
                quest_id: notice.quest_id,
            }),
        );

        // The log still lists the deleted quest, so it is refreshed either way.
        if notice.saved_ids.is_empty() {
            self.refresh.refresh_quest_log(RenderOptions::new()).await?;
        } else {
            self.refresh
                .refresh_quest_preview(notice.saved_ids, true, RenderOptions::new())
                .await?;
        }
        Ok(())
    }

    /// Ask every other client to open a quest.
    pub fn show_quest_preview(&self, quest_id: QuestId) {
        emit(
            self.socket.as_ref(),
            QuestSocketMessage::ShowQuestPreview(ShowQuestPreviewPayload { quest_id }),
        );
    }

    pub fn user_cant_open_quest(&self) {
        emit(
            self.socket.as_ref(),
            QuestSocketMessage::UserCantOpenQuest(UserCantOpenQuestPayload {
                user: self.actor.name.clone(),
            }),
        );
    }

    /// Open or focus the local view of a quest the actor can observe.
    ///
    /// With `notify`, a failed open is shown to the actor and, when the quest
    /// exists but is hidden from them, announced to GM clients.
    pub async fn open_quest(&self, quest_id: &QuestId, notify: bool) -> Result<OpenOutcome, SyncError> {
        let Some(quest) = self.directory.get(quest_id).await? else {
            if notify {
                self.notifier.notify(
                    NotifyLevel::Warn,
                    Notification::QuestNotFound {
                        quest_id: quest_id.clone(),
                    },
                );
            }
            return Ok(OpenOutcome::NotFound);
        };

        if !quest.is_observable_by(&self.actor) {
            if notify {
                self.notifier.notify(
                    NotifyLevel::Warn,
                    Notification::QuestNotObservable {
                        quest_name: quest.name.clone(),
                    },
                );
                self.user_cant_open_quest();
            }
            return Ok(OpenOutcome::NotObservable);
        }

        let view = self.views.open(&quest, &RenderOptions::new().forced()).await?;
        Ok(OpenOutcome::Opened(view))
    }

    pub async fn refresh_quest_log(&self, options: RenderOptions) -> Result<(), SyncError> {
        self.refresh.refresh_quest_log(options).await
    }

    pub async fn refresh_quest_preview(
        &self,
        ids: Vec<QuestId>,
        update_log: bool,
        options: RenderOptions,
    ) -> Result<RefreshReport, SyncError> {
        self.refresh
            .refresh_quest_preview(ids, update_log, options)
            .await
    }

    pub async fn refresh_quest_preview_one(&self, id: QuestId) -> Result<RefreshReport, SyncError> {
        self.refresh.refresh_quest_preview_one(id).await
    }

    pub async fn refresh_quest_group(&self, quest: &Quest) -> Result<RefreshReport, SyncError> {
        self.refresh.refresh_group(quest).await
    }
}
