//! Persistent action metadata cache.
//!
//! Maps `repo/{owner}/{repo}` keys to raw repository payloads and
//! `file/{owner}/{repo}` keys to parsed descriptor payloads. Entries are
//! append-only for the lifetime of the process: once present, a key is never
//! refetched or overwritten. Cross-session staleness is an accepted
//! tradeoff. The whole map is persisted after every insert.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use crate::storage::{BlobStore, ACTION_CACHE_KEY};
use crate::error::Result;

/// Cache key for a repository's stats payload.
pub(crate) fn repo_key(owner: &str, repo: &str) -> String {
    format!("repo/{}/{}", owner, repo)
}

/// Cache key for a repository's action descriptor payload.
pub(crate) fn file_key(owner: &str, repo: &str) -> String {
    format!("file/{}/{}", owner, repo)
}

/// Append-only key-value cache over a [`BlobStore`].
pub struct MetadataCache {
    store: Arc<dyn BlobStore>,
    entries: Mutex<HashMap<String, Value>>,
}

impl MetadataCache {
    /// Create an empty cache over the given store.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Hydrate the cache from storage. Absent or corrupt data starts empty.
    pub async fn load(&self) {
        let blob = match self.store.get(ACTION_CACHE_KEY).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not read action cache, starting empty: {}", e);
                return;
            }
        };

        match serde_json::from_str::<HashMap<String, Value>>(&blob) {
            Ok(parsed) => {
                *self.entries.lock().await = parsed;
            }
            Err(e) => {
                warn!("Discarding corrupt action cache: {}", e);
            }
        }
    }

    /// Look up a cached payload.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Whether a key is present.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    /// Insert a payload and persist the whole map. Existing keys are kept
    /// as-is: the first write wins.
    pub async fn insert(&self, key: String, value: Value) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&key) {
            return Ok(());
        }
        entries.insert(key, value);

        let blob = serde_json::to_string(&*entries)?;
        self.store.put(ACTION_CACHE_KEY, &blob).await
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_absent_starts_empty() {
        let cache = MetadataCache::new(Arc::new(MemoryStore::new()));
        cache.load().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_corrupt_starts_empty() {
        let store = MemoryStore::with_blob(ACTION_CACHE_KEY, "{not json");
        let cache = MetadataCache::new(Arc::new(store));
        cache.load().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_persists_immediately() {
        let store = Arc::new(MemoryStore::new());
        let cache = MetadataCache::new(store.clone());
        cache
            .insert(repo_key("actions", "checkout"), json!({"stargazers_count": 5}))
            .await
            .unwrap();

        let blob = store.get(ACTION_CACHE_KEY).await.unwrap().unwrap();
        let parsed: HashMap<String, Value> = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed["repo/actions/checkout"]["stargazers_count"], 5);
    }

    #[tokio::test]
    async fn test_insert_is_append_only() {
        let cache = MetadataCache::new(Arc::new(MemoryStore::new()));
        cache
            .insert("file/a/b".to_string(), json!({"name": "first"}))
            .await
            .unwrap();
        cache
            .insert("file/a/b".to_string(), json!({"name": "second"}))
            .await
            .unwrap();

        assert_eq!(cache.get("file/a/b").await.unwrap()["name"], "first");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_roundtrip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let first = MetadataCache::new(store.clone());
        first
            .insert(file_key("a", "b"), json!({"name": "x"}))
            .await
            .unwrap();

        let second = MetadataCache::new(store);
        second.load().await;
        assert_eq!(second.get("file/a/b").await.unwrap()["name"], "x");
    }
}
