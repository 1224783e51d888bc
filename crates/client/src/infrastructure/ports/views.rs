//! View registry port: the per-client set of open quest windows.

use async_trait::async_trait;
use questlog_domain::{Quest, QuestId};
use questlog_shared::RenderOptions;

use super::error::ViewError;

/// A live quest view on this client. At most one exists per quest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewHandle {
    pub quest_id: QuestId,
    pub view_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseOptions {
    /// Skip the save-on-close the view would normally perform.
    pub no_save: bool,
}

impl CloseOptions {
    pub fn no_save() -> Self {
        Self { no_save: true }
    }
}

/// Local view bookkeeping.
///
/// Sync traffic only re-renders or closes views returned by `get`; the sole
/// path that creates one is `open`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewRegistry: Send + Sync {
    fn get(&self, quest_id: &QuestId) -> Option<ViewHandle>;

    /// Open a view for `quest`, or focus the existing one.
    async fn open(&self, quest: &Quest, options: &RenderOptions) -> Result<ViewHandle, ViewError>;

    async fn render(&self, view: &ViewHandle, options: &RenderOptions) -> Result<(), ViewError>;

    async fn close(&self, view: &ViewHandle, options: CloseOptions) -> Result<(), ViewError>;

    /// Re-render the quest log index and any other listing views.
    async fn render_log(&self, options: &RenderOptions) -> Result<(), ViewError>;

    /// Discard pending dialogs (delete confirmations, etc.) that reference a quest.
    async fn close_dialogs(&self, quest_id: &QuestId) -> Result<(), ViewError>;
}
