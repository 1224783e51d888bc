//! Quest entity - the shared, tree-positioned unit of the quest log
//!
//! Quests form a tree: a quest may sit under one parent and may own an ordered
//! list of subquests. Status and reward changes on one quest show up in the
//! summaries rendered by its relatives, which is why refreshes are always
//! computed over the whole group.

use serde::{Deserialize, Serialize};

use crate::ids::{QuestId, RewardId};
use crate::value_objects::{Actor, PermissionLevel, QuestPermissions, QuestStatus};

/// A reward that can be claimed by dragging it out of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub name: String,
}

impl Reward {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RewardId::generate(),
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RewardId>) -> Self {
        self.id = id.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub name: String,
    pub status: QuestStatus,
    #[serde(default)]
    pub parent: Option<QuestId>,
    #[serde(default)]
    pub subquests: Vec<QuestId>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    #[serde(default)]
    pub permissions: QuestPermissions,
}

impl Quest {
    pub fn new(id: impl Into<QuestId>, name: impl Into<String>, status: QuestStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            parent: None,
            subquests: Vec::new(),
            rewards: Vec::new(),
            permissions: QuestPermissions::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<QuestId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_subquest(mut self, child: impl Into<QuestId>) -> Self {
        self.subquests.push(child.into());
        self
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.rewards.push(reward);
        self
    }

    pub fn with_permissions(mut self, permissions: QuestPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn parent_id(&self) -> Option<&QuestId> {
        self.parent.as_ref()
    }

    pub fn child_ids(&self) -> &[QuestId] {
        &self.subquests
    }

    pub fn is_owner(&self, actor: &Actor) -> bool {
        actor.is_gm() || self.permissions.level_for(&actor.id) == PermissionLevel::Owner
    }

    /// Whether `actor` may currently see this quest's detail view.
    ///
    /// GMs see everything. Everyone else needs at least observer permission and
    /// loses sight of the quest while it is inactive.
    pub fn is_observable_by(&self, actor: &Actor) -> bool {
        if actor.is_gm() {
            return true;
        }
        !self.status.is_hidden() && self.permissions.level_for(&actor.id) >= PermissionLevel::Observer
    }

    /// Move the quest to `target`. Returns `false` when it was already there.
    pub fn apply_move(&mut self, target: QuestStatus) -> bool {
        if self.status == target {
            return false;
        }
        self.status = target;
        true
    }

    /// Remove a claimed reward. Returns `false` when no such reward remains.
    pub fn remove_reward(&mut self, reward_id: &RewardId) -> bool {
        let before = self.rewards.len();
        self.rewards.retain(|reward| &reward.id != reward_id);
        self.rewards.len() != before
    }

    pub fn reward(&self, reward_id: &RewardId) -> Option<&Reward> {
        self.rewards.iter().find(|reward| &reward.id == reward_id)
    }
}
