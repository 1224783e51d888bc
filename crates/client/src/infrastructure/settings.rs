//! Session settings that gate player-initiated mutations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Module settings a GM can toggle during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Players may ask a GM to move quests out of the active category.
    pub allow_players_accept: bool,
    /// Trusted players get edit rights over quests they own.
    pub trusted_player_edit: bool,
    /// GM clients announce claimed rewards.
    pub notify_reward_drop: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            allow_players_accept: false,
            trusted_player_edit: false,
            notify_reward_drop: true,
        }
    }
}

/// Settings handle shared between the context and its use cases.
pub type SharedSettings = Arc<RwLock<SyncSettings>>;

impl SyncSettings {
    /// Load overrides from `QUESTLOG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| match lookup(key) {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(key, value = %raw, "Ignoring unparseable boolean setting");
                default
            }),
            None => default,
        };

        Self {
            allow_players_accept: flag(
                "QUESTLOG_ALLOW_PLAYERS_ACCEPT",
                defaults.allow_players_accept,
            ),
            trusted_player_edit: flag("QUESTLOG_TRUSTED_PLAYER_EDIT", defaults.trusted_player_edit),
            notify_reward_drop: flag("QUESTLOG_NOTIFY_REWARD_DROP", defaults.notify_reward_drop),
        }
    }

    pub fn shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
