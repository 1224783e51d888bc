//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the client. Ports exist for:
//! - Quest storage (the replicated document store)
//! - Local views (windows, the log index, dialogs)
//! - User notifications
//! - The shared socket channel

mod directory;
mod error;
mod notify;
mod socket;
mod views;

pub use directory::QuestDirectory;
pub use error::{RepoError, TransportError, ViewError};
pub use notify::{Notification, NotificationSink, NotifyLevel};
pub use socket::SocketEmitter;
pub use views::{CloseOptions, ViewHandle, ViewRegistry};

#[cfg(test)]
pub use directory::MockQuestDirectory;
#[cfg(test)]
pub use notify::MockNotificationSink;
#[cfg(test)]
pub use socket::MockSocketEmitter;
#[cfg(test)]
pub use views::MockViewRegistry;
