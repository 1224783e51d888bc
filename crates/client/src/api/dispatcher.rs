//! Socket dispatcher.
//!
//! The single subscription point on the shared channel. Every envelope is
//! decoded, routed by kind and handled to completion before the next one is
//! taken. Handler failures and panics are logged and swallowed so that one bad
//! message cannot stop synchronization for the rest of the session.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use questlog_shared::{MessageKind, QuestSocketMessage, QUEST_SOCKET_CHANNEL};

use super::handlers;
use crate::app::SyncContext;
use crate::use_cases::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled(MessageKind),
    /// Not a recognizable envelope.
    Dropped,
    /// The handler returned an error or panicked.
    Failed(MessageKind),
}

pub struct Dispatcher {
    context: Arc<SyncContext>,
    listening: AtomicBool,
}

impl Dispatcher {
    pub fn new(context: Arc<SyncContext>) -> Arc<Self> {
        Arc::new(Self {
            context,
            listening: AtomicBool::new(false),
        })
    }

    pub fn context(&self) -> &Arc<SyncContext> {
        &self.context
    }

    /// Drain `inbox` on a spawned task for the rest of the session.
    ///
    /// Installs at most one listener per dispatcher.
    pub fn listen(
        self: &Arc<Self>,
        mut inbox: mpsc::Receiver<Value>,
    ) -> Result<JoinHandle<()>, SyncError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyListening);
        }

        let dispatcher = Arc::clone(self);
        Ok(tokio::spawn(async move {
            tracing::info!(
                channel = QUEST_SOCKET_CHANNEL,
                user = %dispatcher.context.actor.name,
                "Listening for quest log messages"
            );
            while let Some(value) = inbox.recv().await {
                dispatcher.dispatch_value(value).await;
            }
            tracing::info!(user = %dispatcher.context.actor.name, "Quest log channel closed");
        }))
    }

    /// Decode and dispatch one raw envelope. Malformed input is dropped silently.
    pub async fn dispatch_value(&self, value: Value) -> DispatchOutcome {
        match QuestSocketMessage::from_value(value) {
            Ok(message) => self.dispatch(message).await,
            Err(_) => DispatchOutcome::Dropped,
        }
    }

    pub async fn dispatch(&self, message: QuestSocketMessage) -> DispatchOutcome {
        let kind = message.kind();
        tracing::debug!(%kind, user = %self.context.actor.name, "Dispatching quest log message");

        match AssertUnwindSafe(self.route(message)).catch_unwind().await {
            Ok(Ok(())) => DispatchOutcome::Handled(kind),
            Ok(Err(e)) => {
                tracing::error!(%kind, error = %e, "Quest log handler failed");
                DispatchOutcome::Failed(kind)
            }
            Err(panic) => {
                tracing::error!(%kind, panic = panic_message(panic.as_ref()), "Quest log handler panicked");
                DispatchOutcome::Failed(kind)
            }
        }
    }

    async fn route(&self, message: QuestSocketMessage) -> Result<(), SyncError> {
        let ctx = self.context.as_ref();
        match message {
            QuestSocketMessage::DeletedQuest(payload) => handlers::deleted_quest(ctx, payload).await,
            QuestSocketMessage::MoveQuest(payload) => handlers::move_quest(ctx, payload).await,
            QuestSocketMessage::QuestLogRefresh(payload) => {
                handlers::quest_log_refresh(ctx, payload).await
            }
            QuestSocketMessage::QuestPreviewRefresh(payload) => {
                handlers::quest_preview_refresh(ctx, payload).await
            }
            QuestSocketMessage::QuestRewardDrop(payload) => {
                handlers::quest_reward_drop(ctx, payload).await
            }
            QuestSocketMessage::ShowQuestPreview(payload) => {
                handlers::show_quest_preview(ctx, payload).await
            }
            QuestSocketMessage::UserCantOpenQuest(payload) => {
                handlers::user_cant_open_quest(ctx, payload).await
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
