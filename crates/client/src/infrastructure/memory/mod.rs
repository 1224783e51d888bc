//! In-process adapters for the client ports.

mod notifier;
mod quest_store;
mod view_registry;

pub use notifier::RecordingNotifier;
pub use quest_store::InMemoryQuestStore;
pub use view_registry::{InMemoryViewRegistry, ViewEvent};
