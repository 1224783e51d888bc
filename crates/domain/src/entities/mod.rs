//! Entities - objects with identity that persist across messages

mod quest;

pub use quest::{Quest, Reward};
