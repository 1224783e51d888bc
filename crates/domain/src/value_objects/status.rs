//! Quest status categories.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The category a quest is filed under in the log.
///
/// `Active` is the privileged category players may request a quest be moved
/// into. `Inactive` quests are hidden from everyone but GMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Available,
    Completed,
    Failed,
    Inactive,
}

impl QuestStatus {
    pub const ALL: [QuestStatus; 5] = [
        Self::Active,
        Self::Available,
        Self::Completed,
        Self::Failed,
        Self::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Available => "available",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Inactive => "inactive",
        }
    }

    /// Human readable label for notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "In Progress",
            Self::Available => "Available",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Inactive => "Inactive",
        }
    }

    /// Whether quests in this category are hidden from non-GM users.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Inactive)
    }
}

impl std::fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "available" => Ok(Self::Available),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "inactive" => Ok(Self::Inactive),
            other => Err(DomainError::parse(format!("unknown quest status: {other}"))),
        }
    }
}
