//! Notification sink port for user-facing toasts.

use questlog_domain::{QuestId, QuestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
}

/// Typed user-facing messages. Rendering text is the sink's business; the
/// `Display` impl is the default English wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    QuestMoved {
        target: QuestStatus,
    },
    RewardDropped {
        user_name: String,
        item_name: String,
        actor_name: String,
    },
    UserCantOpen {
        user: String,
    },
    QuestNotFound {
        quest_id: QuestId,
    },
    QuestNotObservable {
        quest_name: String,
    },
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuestMoved { target } => write!(f, "Quest moved to {}", target.label()),
            Self::RewardDropped {
                user_name,
                item_name,
                actor_name,
            } => write!(f, "{user_name} dropped {item_name} on {actor_name}"),
            Self::UserCantOpen { user } => {
                write!(f, "{user} tried to open a quest they cannot view")
            }
            Self::QuestNotFound { quest_id } => write!(f, "Quest {quest_id} not found"),
            Self::QuestNotObservable { quest_name } => {
                write!(f, "You do not have permission to view {quest_name}")
            }
        }
    }
}

/// Fire-and-forget notification delivery.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: NotifyLevel, notification: Notification);
}
