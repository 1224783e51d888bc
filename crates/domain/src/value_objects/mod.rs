//! Value objects - Immutable objects defined by their attributes

mod permission;
mod role;
mod status;

pub use permission::{PermissionLevel, QuestPermissions};
pub use role::{Actor, UserRole};
pub use status::QuestStatus;
