//! Quest Log Domain
//!
//! Pure entity model for the shared quest log: quests, rewards, roles and the
//! permission rules that decide ownership and observability. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{Quest, Reward};
pub use error::DomainError;
pub use ids::{QuestId, RewardId, UserId};
pub use value_objects::{Actor, PermissionLevel, QuestPermissions, QuestStatus, UserRole};
