//! Authority resolution for quest mutations.
//!
//! Pure functions of the acting user, the ownership predicate, the `handled`
//! flag and the session settings. Nothing here touches ports, so every rule
//! is testable in isolation.
//!
//! Each mutating message kind has one of two shapes. `deletedQuest` announces
//! a fact the sender already committed, so receivers never re-apply it.
//! `moveQuest` and `questRewardDrop` request application: the first GM client
//! to see an unhandled request applies it. Two GM clients can both see the
//! same unhandled request before either acknowledgement arrives; both then
//! apply it, which is harmless only because moves and reward removals are
//! idempotent on the quest document.

use questlog_domain::{Actor, QuestStatus};

use crate::infrastructure::settings::SyncSettings;

/// What the client that initiated a move should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// Apply now, then broadcast with `handled = true`.
    ApplyLocally,
    /// Broadcast with `handled = false` and let a GM client apply it.
    RequestPrivileged,
    /// Drop the request without broadcasting anything.
    Refuse,
}

/// GMs always apply. Trusted players apply moves on quests they own.
///
/// Anyone else may only ask a GM, and only for moves into the active category
/// unless the session lets players accept quests.
pub fn resolve_move(
    actor: &Actor,
    is_owner: bool,
    target: QuestStatus,
    settings: &SyncSettings,
) -> MoveDecision {
    if actor.is_gm() || (actor.is_trusted_player(settings.trusted_player_edit) && is_owner) {
        return MoveDecision::ApplyLocally;
    }
    if target != QuestStatus::Active && !settings.allow_players_accept {
        return MoveDecision::Refuse;
    }
    MoveDecision::RequestPrivileged
}

/// What a receiving client does with a `moveQuest` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMoveAction {
    /// Apply the move and broadcast the refresh group.
    Apply,
    /// The move is already applied; re-evaluate local views only.
    Reflect,
    /// Still unhandled and this client may not apply it.
    Ignore,
}

pub fn resolve_remote_move(actor: &Actor, handled: bool) -> RemoteMoveAction {
    match (handled, actor.is_gm()) {
        (true, _) => RemoteMoveAction::Reflect,
        (false, true) => RemoteMoveAction::Apply,
        (false, false) => RemoteMoveAction::Ignore,
    }
}

/// Non-GM clients drop their view of a quest that was hidden.
pub fn should_close_on_remote_move(actor: &Actor, target: QuestStatus) -> bool {
    !actor.is_gm() && target == QuestStatus::Inactive
}

/// Only GM clients remove claimed rewards.
pub fn resolve_reward_drop(actor: &Actor) -> bool {
    actor.is_gm()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardDropDecision {
    pub apply: bool,
    pub notify: bool,
}

/// The notification is a presentation echo and ignores `handled`.
pub fn resolve_remote_reward_drop(
    actor: &Actor,
    handled: bool,
    settings: &SyncSettings,
) -> RewardDropDecision {
    let gm = actor.is_gm();
    RewardDropDecision {
        apply: gm && !handled,
        notify: gm && settings.notify_reward_drop,
    }
}

pub fn should_warn_cant_open(actor: &Actor) -> bool {
    actor.is_gm()
}
