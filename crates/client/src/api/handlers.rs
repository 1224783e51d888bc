//! Handlers for inbound quest log messages, one per kind.
//!
//! Handlers only re-render or close views that already exist on this client.
//! The one exception is `showQuestPreview`, whose whole point is to open one.

use questlog_domain::QuestId;
use questlog_shared::{
    DeletedQuestPayload, MoveQuestPayload, QuestLogRefreshPayload, QuestPreviewRefreshPayload,
    QuestSocketMessage, RewardDropPayload, ShowQuestPreviewPayload, UserCantOpenQuestPayload,
};

use crate::app::SyncContext;
use crate::infrastructure::ports::{CloseOptions, Notification, NotifyLevel};
use crate::use_cases::authority::{self, RemoteMoveAction};
use crate::use_cases::{emit, SyncError};

/// The sender already deleted the quest. Never reads the directory.
pub async fn deleted_quest(
    ctx: &SyncContext,
    payload: DeletedQuestPayload,
) -> Result<(), SyncError> {
    ctx.ports.views.close_dialogs(&payload.quest_id).await?;
    close_view(ctx, &payload.quest_id, CloseOptions::no_save()).await
}

pub async fn move_quest(ctx: &SyncContext, payload: MoveQuestPayload) -> Result<(), SyncError> {
    if authority::should_close_on_remote_move(&ctx.actor, payload.target) {
        close_view(ctx, &payload.quest_id, CloseOptions::no_save()).await?;
    }

    match authority::resolve_remote_move(&ctx.actor, payload.handled) {
        RemoteMoveAction::Apply => {
            let applied = ctx
                .quest_socket
                .apply_move(&payload.quest_id, payload.target)
                .await?;
            if applied.is_none() {
                close_view(ctx, &payload.quest_id, CloseOptions::default()).await?;
            }
        }
        RemoteMoveAction::Reflect => match ctx.ports.directory.get(&payload.quest_id).await? {
            Some(quest) => {
                ctx.refresh.reflect_group(&quest).await?;
            }
            None => close_view(ctx, &payload.quest_id, CloseOptions::default()).await?,
        },
        RemoteMoveAction::Ignore => {
            tracing::trace!(quest_id = %payload.quest_id, "Unhandled move left for a GM client");
        }
    }
    Ok(())
}

pub async fn quest_log_refresh(
    ctx: &SyncContext,
    payload: QuestLogRefreshPayload,
) -> Result<(), SyncError> {
    ctx.refresh.reflect_quest_log(payload.options).await
}

pub async fn quest_preview_refresh(
    ctx: &SyncContext,
    payload: QuestPreviewRefreshPayload,
) -> Result<(), SyncError> {
    let ids = payload.quest_id.into_ids();
    let report = ctx
        .refresh
        .reflect_quest_preview(&ids, &payload.options)
        .await?;
    tracing::debug!(
        rendered = report.rendered.len(),
        closed = report.closed.len(),
        "Quest previews refreshed"
    );
    Ok(())
}

/// GM clients announce the claim once and the first to see it unhandled
/// removes the reward, then re-broadcasts it as handled.
pub async fn quest_reward_drop(
    ctx: &SyncContext,
    payload: RewardDropPayload,
) -> Result<(), SyncError> {
    let settings = ctx.settings().await;
    let decision = authority::resolve_remote_reward_drop(&ctx.actor, payload.handled, &settings);

    if decision.notify
        && ctx
            .announced_drops
            .insert_if_absent(payload.claim.reward_id.clone())
            .await
    {
        ctx.ports.notifier.notify(
            NotifyLevel::Info,
            Notification::RewardDropped {
                user_name: payload.claim.user_name.clone(),
                item_name: payload.claim.item_name.clone(),
                actor_name: payload.actor.name.clone(),
            },
        );
    }

    if decision.apply {
        ctx.quest_socket
            .remove_claimed_reward(&payload.claim)
            .await?;
        emit(
            ctx.ports.socket.as_ref(),
            QuestSocketMessage::QuestRewardDrop(RewardDropPayload {
                handled: true,
                ..payload
            }),
        );
    }
    Ok(())
}

pub async fn show_quest_preview(
    ctx: &SyncContext,
    payload: ShowQuestPreviewPayload,
) -> Result<(), SyncError> {
    ctx.quest_socket
        .open_quest(&payload.quest_id, false)
        .await?;
    Ok(())
}

pub async fn user_cant_open_quest(
    ctx: &SyncContext,
    payload: UserCantOpenQuestPayload,
) -> Result<(), SyncError> {
    if authority::should_warn_cant_open(&ctx.actor) {
        ctx.ports.notifier.notify(
            NotifyLevel::Warn,
            Notification::UserCantOpen { user: payload.user },
        );
    }
    Ok(())
}

async fn close_view(
    ctx: &SyncContext,
    quest_id: &QuestId,
    options: CloseOptions,
) -> Result<(), SyncError> {
    if let Some(view) = ctx.ports.views.get(quest_id) {
        ctx.ports.views.close(&view, options).await?;
    }
    Ok(())
}
