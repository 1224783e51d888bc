//! Refresh broadcaster: re-render or close the views touched by a mutation.
//!
//! A change to one quest shows up in the summaries of its parent and of every
//! descendant, so refreshes are computed over that whole group. Each client
//! runs the same computation against its own views: render when the acting
//! user can still observe the quest, close otherwise.

use std::collections::HashSet;
use std::sync::Arc;

use questlog_domain::{Actor, Quest, QuestId};
use questlog_shared::{
    QuestIdSelector, QuestLogRefreshPayload, QuestPreviewRefreshPayload, QuestSocketMessage,
    RenderOptions,
};

use super::{emit, SyncError};
use crate::infrastructure::ports::{
    CloseOptions, QuestDirectory, SocketEmitter, ViewHandle, ViewRegistry,
};

/// Views touched by one local refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub rendered: Vec<QuestId>,
    pub closed: Vec<QuestId>,
}

pub struct RefreshBroadcaster {
    actor: Actor,
    directory: Arc<dyn QuestDirectory>,
    views: Arc<dyn ViewRegistry>,
    socket: Arc<dyn SocketEmitter>,
}

impl RefreshBroadcaster {
    pub fn new(
        actor: Actor,
        directory: Arc<dyn QuestDirectory>,
        views: Arc<dyn ViewRegistry>,
        socket: Arc<dyn SocketEmitter>,
    ) -> Self {
        Self {
            actor,
            directory,
            views,
            socket,
        }
    }

    /// Re-render the log here and on every other client.
    pub async fn refresh_quest_log(&self, options: RenderOptions) -> Result<(), SyncError> {
        emit(
            self.socket.as_ref(),
            QuestSocketMessage::QuestLogRefresh(QuestLogRefreshPayload {
                options: options.clone(),
            }),
        );
        self.reflect_quest_log(options).await
    }

    /// Local half of a log refresh. Always forced.
    pub async fn reflect_quest_log(&self, options: RenderOptions) -> Result<(), SyncError> {
        self.views.render_log(&options.forced()).await?;
        Ok(())
    }

    /// Re-evaluate the named quest views here and on every other client.
    ///
    /// With `update_log` the log views are refreshed as well.
    pub async fn refresh_quest_preview(
        &self,
        ids: Vec<QuestId>,
        update_log: bool,
        options: RenderOptions,
    ) -> Result<RefreshReport, SyncError> {
        emit(
            self.socket.as_ref(),
            QuestSocketMessage::QuestPreviewRefresh(QuestPreviewRefreshPayload {
                quest_id: QuestIdSelector::from(ids.clone()),
                options: options.clone(),
            }),
        );
        let report = self.reflect_quest_preview(&ids, &options).await?;
        if update_log {
            self.refresh_quest_log(RenderOptions::new()).await?;
        }
        Ok(report)
    }

    pub async fn refresh_quest_preview_one(&self, id: QuestId) -> Result<RefreshReport, SyncError> {
        self.refresh_quest_preview(vec![id], true, RenderOptions::new())
            .await
    }

    /// Local half of a preview refresh.
    ///
    /// Only views that already exist are touched. A quest that is gone from
    /// the directory, or that the actor can no longer observe, has its view
    /// closed.
    pub async fn reflect_quest_preview(
        &self,
        ids: &[QuestId],
        options: &RenderOptions,
    ) -> Result<RefreshReport, SyncError> {
        let mut report = RefreshReport::default();
        let mut seen = HashSet::new();

        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            let Some(view) = self.views.get(id) else {
                continue;
            };

            let found = match self.directory.get(id).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(quest_id = %id, error = %e, "Failed to load quest for refresh");
                    continue;
                }
            };

            match found {
                Some(quest) if quest.is_observable_by(&self.actor) => {
                    match self.views.render(&view, options).await {
                        Ok(()) => report.rendered.push(id.clone()),
                        Err(e) => {
                            tracing::warn!(quest_id = %id, error = %e, "Failed to render quest view")
                        }
                    }
                }
                Some(_) => {
                    tracing::debug!(quest_id = %id, "Quest no longer observable, closing view");
                    self.close_view(&view, &mut report).await;
                }
                None => {
                    tracing::debug!(quest_id = %id, "Quest no longer exists, closing view");
                    self.close_view(&view, &mut report).await;
                }
            }
        }

        Ok(report)
    }

    /// Refresh a quest's whole group everywhere, log included.
    pub async fn refresh_group(&self, quest: &Quest) -> Result<RefreshReport, SyncError> {
        let ids = self.affected_ids(quest).await?;
        self.refresh_quest_preview(ids, true, RenderOptions::new())
            .await
    }

    /// Local half of a group refresh, log included. Emits nothing.
    pub async fn reflect_group(&self, quest: &Quest) -> Result<RefreshReport, SyncError> {
        let ids = self.affected_ids(quest).await?;
        let report = self.reflect_quest_preview(&ids, &RenderOptions::new()).await?;
        self.reflect_quest_log(RenderOptions::new()).await?;
        Ok(report)
    }

    /// Parent, the quest itself, then every descendant in depth-first order.
    ///
    /// Descendants are resolved through the directory. Ids missing from the
    /// directory are kept so their views still get closed.
    pub async fn affected_ids(&self, quest: &Quest) -> Result<Vec<QuestId>, SyncError> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();

        if let Some(parent) = quest.parent_id() {
            seen.insert(parent.clone());
            ids.push(parent.clone());
        }
        if seen.insert(quest.id.clone()) {
            ids.push(quest.id.clone());
        }

        let mut pending: Vec<QuestId> = quest.child_ids().iter().rev().cloned().collect();
        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(child) = self.directory.get(&id).await? {
                pending.extend(child.child_ids().iter().rev().cloned());
            }
            ids.push(id);
        }

        Ok(ids)
    }

    async fn close_view(&self, view: &ViewHandle, report: &mut RefreshReport) {
        match self.views.close(view, CloseOptions::default()).await {
            Ok(()) => report.closed.push(view.quest_id.clone()),
            Err(e) => {
                tracing::warn!(quest_id = %view.quest_id, error = %e, "Failed to close quest view")
            }
        }
    }
}
