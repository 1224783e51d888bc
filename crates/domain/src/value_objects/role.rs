//! User roles and the acting user.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Session role of a connected user, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Player,
    Trusted,
    Assistant,
    Gamemaster,
}

impl UserRole {
    /// Assistants and gamemasters both hold GM authority.
    pub fn is_gm(&self) -> bool {
        matches!(self, Self::Assistant | Self::Gamemaster)
    }
}

/// The user a client acts on behalf of.
///
/// Passed explicitly into every authority decision instead of being read from
/// ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn gm(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self::new(id, name, UserRole::Gamemaster)
    }

    pub fn player(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self::new(id, name, UserRole::Player)
    }

    pub fn is_gm(&self) -> bool {
        self.role.is_gm()
    }

    /// Trusted players only gain edit rights while the session allows it.
    pub fn is_trusted_player(&self, trusted_player_edit: bool) -> bool {
        trusted_player_edit && self.role == UserRole::Trusted
    }
}
