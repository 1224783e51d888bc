//! In-memory quest document store.
//!
//! Stands in for the replicated document store every client of a session
//! reads from. One instance is shared by all local clients.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use questlog_domain::{Quest, QuestId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{QuestDirectory, RepoError};

#[derive(Default)]
pub struct InMemoryQuestStore {
    quests: RwLock<HashMap<QuestId, Quest>>,
    revision: AtomicU64,
}

impl InMemoryQuestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a quest without counting it as a write.
    pub async fn insert(&self, quest: Quest) {
        self.quests.write().await.insert(quest.id.clone(), quest);
    }

    /// Delete a quest document. Counts as a write when something was removed.
    pub async fn remove(&self, id: &QuestId) -> Option<Quest> {
        let removed = self.quests.write().await.remove(id);
        if removed.is_some() {
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    /// Number of saves that actually changed a stored document.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self, id: &QuestId) -> Option<Quest> {
        self.quests.read().await.get(id).cloned()
    }
}

#[async_trait]
impl QuestDirectory for InMemoryQuestStore {
    async fn get(&self, id: &QuestId) -> Result<Option<Quest>, RepoError> {
        Ok(self.quests.read().await.get(id).cloned())
    }

    async fn save(&self, quest: &Quest) -> Result<(), RepoError> {
        let mut guard = self.quests.write().await;
        if guard.get(&quest.id) == Some(quest) {
            tracing::trace!(quest_id = %quest.id, "Save skipped, document unchanged");
            return Ok(());
        }
        guard.insert(quest.id.clone(), quest.clone());
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(quest_id = %quest.id, revision, "Quest saved");
        Ok(())
    }
}
