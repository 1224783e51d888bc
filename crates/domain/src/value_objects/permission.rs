//! Per-user permission levels on a quest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    None,
    Limited,
    Observer,
    Owner,
}

/// Default level plus per-user overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestPermissions {
    #[serde(default)]
    pub default: PermissionLevel,
    #[serde(default)]
    pub users: HashMap<UserId, PermissionLevel>,
}

impl QuestPermissions {
    pub fn with_default(default: PermissionLevel) -> Self {
        Self {
            default,
            users: HashMap::new(),
        }
    }

    pub fn grant(mut self, user: impl Into<UserId>, level: PermissionLevel) -> Self {
        self.users.insert(user.into(), level);
        self
    }

    /// Explicit user level wins over the default.
    pub fn level_for(&self, user: &UserId) -> PermissionLevel {
        self.users.get(user).copied().unwrap_or(self.default)
    }
}
