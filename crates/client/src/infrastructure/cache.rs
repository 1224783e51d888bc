//! TTL-based set for ephemeral per-session bookkeeping.
//!
//! Remembers keys for a bounded time so long sessions do not grow memory
//! without limit.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe key set with time-to-live expiration.
pub struct TtlSet<K> {
    entries: RwLock<HashMap<K, Instant>>,
    ttl: Duration,
}

impl<K> TtlSet<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Record `key` unless a live entry exists. Returns `true` if it was new.
    ///
    /// Expired entries are purged on the way in.
    pub async fn insert_if_absent(&self, key: K) -> bool {
        self.insert_at_if_absent(key, Instant::now()).await
    }

    async fn insert_at_if_absent(&self, key: K, now: Instant) -> bool {
        let mut guard = self.entries.write().await;
        let ttl = self.ttl;
        guard.retain(|_, inserted_at| now.saturating_duration_since(*inserted_at) < ttl);
        if guard.contains_key(&key) {
            return false;
        }
        guard.insert(key, now);
        true
    }

    /// Check if a key exists and hasn't expired.
    pub async fn contains(&self, key: &K) -> bool {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .is_some_and(|inserted_at| inserted_at.elapsed() < self.ttl)
    }

    /// Get the current number of entries (including expired ones not yet purged).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
