//! In-memory view registry that records every view operation.
//!
//! Used by the session binary and the multi-client tests in place of a real
//! windowing layer.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use questlog_domain::{Quest, QuestId};
use questlog_shared::RenderOptions;
use tokio::sync::Mutex;

use crate::infrastructure::ports::{CloseOptions, ViewError, ViewHandle, ViewRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Opened(QuestId),
    Focused(QuestId),
    Rendered(QuestId),
    Closed { quest_id: QuestId, no_save: bool },
    LogRendered,
    DialogsClosed(QuestId),
}

#[derive(Default)]
pub struct InMemoryViewRegistry {
    views: DashMap<QuestId, ViewHandle>,
    next_view_id: AtomicU64,
    events: Mutex<Vec<ViewEvent>>,
}

impl InMemoryViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, quest_id: &QuestId) -> bool {
        self.views.contains_key(quest_id)
    }

    pub async fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().await.clone()
    }

    pub async fn clear_events(&self) {
        self.events.lock().await.clear();
    }

    /// Quest ids rendered since the last `clear_events`, in order.
    pub async fn rendered(&self) -> Vec<QuestId> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Rendered(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, event: ViewEvent) {
        tracing::debug!(?event, "View event");
        self.events.lock().await.push(event);
    }
}

#[async_trait]
impl ViewRegistry for InMemoryViewRegistry {
    fn get(&self, quest_id: &QuestId) -> Option<ViewHandle> {
        self.views.get(quest_id).map(|entry| entry.value().clone())
    }

    async fn open(&self, quest: &Quest, _options: &RenderOptions) -> Result<ViewHandle, ViewError> {
        if let Some(existing) = self.get(&quest.id) {
            self.record(ViewEvent::Focused(quest.id.clone())).await;
            return Ok(existing);
        }
        let handle = ViewHandle {
            quest_id: quest.id.clone(),
            view_id: self.next_view_id.fetch_add(1, Ordering::SeqCst),
        };
        self.views.insert(quest.id.clone(), handle.clone());
        self.record(ViewEvent::Opened(quest.id.clone())).await;
        Ok(handle)
    }

    async fn render(&self, view: &ViewHandle, _options: &RenderOptions) -> Result<(), ViewError> {
        match self.views.get(&view.quest_id) {
            Some(current) if current.view_id == view.view_id => {}
            _ => return Err(ViewError::render(format!("view {} is closed", view.view_id))),
        }
        self.record(ViewEvent::Rendered(view.quest_id.clone())).await;
        Ok(())
    }

    async fn close(&self, view: &ViewHandle, options: CloseOptions) -> Result<(), ViewError> {
        if self
            .views
            .remove_if(&view.quest_id, |_, current| current.view_id == view.view_id)
            .is_none()
        {
            return Ok(());
        }
        self.record(ViewEvent::Closed {
            quest_id: view.quest_id.clone(),
            no_save: options.no_save,
        })
        .await;
        Ok(())
    }

    async fn render_log(&self, _options: &RenderOptions) -> Result<(), ViewError> {
        self.record(ViewEvent::LogRendered).await;
        Ok(())
    }

    async fn close_dialogs(&self, quest_id: &QuestId) -> Result<(), ViewError> {
        self.record(ViewEvent::DialogsClosed(quest_id.clone())).await;
        Ok(())
    }
}
