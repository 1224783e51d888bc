//! Quest directory port: resolves and persists quest documents.

use async_trait::async_trait;
use questlog_domain::{Quest, QuestId};

use super::error::RepoError;

/// Resolves a quest id to the current document and persists changes.
///
/// `get` returns an owned snapshot; callers mutate it through the domain
/// methods and hand it back to `save`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestDirectory: Send + Sync {
    async fn get(&self, id: &QuestId) -> Result<Option<Quest>, RepoError>;
    async fn save(&self, quest: &Quest) -> Result<(), RepoError>;
}
