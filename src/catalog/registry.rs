//! Action registry - the working set of resolved actions.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::info;

use super::resolver::ActionResolver;
use super::types::Action;
use crate::error::Result;

/// Holds the resolved working set: a fixed `standard` set of built-in
/// pseudo-actions, a curated `recommended` set, and the append-only `loaded`
/// set touched by [`ActionRegistry::get`]. A reference is never resolved
/// twice within one registry's lifetime.
pub struct ActionRegistry {
    resolver: ActionResolver,
    standard: Vec<Arc<Action>>,
    recommended: Vec<Arc<Action>>,
    loaded: Mutex<Vec<Arc<Action>>>,
}

fn standard_set() -> Vec<Action> {
    vec![
        Action::builtin("_shell/bash", "Bash", "Run a bash script"),
        Action::builtin("_shell/python", "Python", "Run a Python script"),
    ]
}

fn recommended_set() -> Vec<Action> {
    vec![
        Action::with_summary(
            "actions/checkout@v2",
            "Checkout",
            "Run a git clone to get your code",
        ),
        Action::with_summary("actions/setup-node@v1", "Setup Node.js", ""),
        Action::with_summary("actions/setup-python@v2", "Setup Python", ""),
    ]
}

impl ActionRegistry {
    /// Create an empty registry over the given resolver.
    pub fn new(resolver: ActionResolver) -> Self {
        Self {
            resolver,
            standard: Vec::new(),
            recommended: Vec::new(),
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Resolve the standard and recommended sets concurrently and seed the
    /// loaded set with both.
    pub async fn populate_initial(&mut self) -> Result<()> {
        let standard = self.resolve_all(standard_set()).await?;
        let recommended = self.resolve_all(recommended_set()).await?;

        let mut loaded = self.loaded.lock().await;
        loaded.extend(standard.iter().cloned());
        loaded.extend(recommended.iter().cloned());
        self.standard = standard;
        self.recommended = recommended;

        info!(count = loaded.len(), "Populated initial action sets");
        Ok(())
    }

    /// Look up an action by reference, resolving and appending to the
    /// loaded set on first sight.
    pub async fn get(&self, reference: &str) -> Result<Arc<Action>> {
        if let Some(found) = self.lookup(reference).await {
            return Ok(found);
        }

        let resolved = self
            .resolver
            .resolve(Action::from_reference(reference))
            .await?;

        let mut loaded = self.loaded.lock().await;
        // A concurrent identical lookup may have won the append; keep the
        // first instance so shared references stay stable.
        if let Some(found) = loaded.iter().find(|a| a.id == reference) {
            return Ok(found.clone());
        }
        let action = Arc::new(resolved);
        loaded.push(action.clone());
        Ok(action)
    }

    /// The fixed built-in set (populated by [`Self::populate_initial`]).
    pub fn standard(&self) -> &[Arc<Action>] {
        &self.standard
    }

    /// The curated external set (populated by [`Self::populate_initial`]).
    pub fn recommended(&self) -> &[Arc<Action>] {
        &self.recommended
    }

    /// Snapshot of the loaded working set.
    pub async fn loaded(&self) -> Vec<Arc<Action>> {
        self.loaded.lock().await.clone()
    }

    async fn lookup(&self, reference: &str) -> Option<Arc<Action>> {
        self.loaded
            .lock()
            .await
            .iter()
            .find(|a| a.id == reference)
            .cloned()
    }

    async fn resolve_all(&self, actions: Vec<Action>) -> Result<Vec<Arc<Action>>> {
        let resolved = join_all(actions.into_iter().map(|a| self.resolver.resolve(a))).await;
        resolved
            .into_iter()
            .map(|r| r.map(Arc::new))
            .collect::<Result<Vec<_>>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetadataCache;
    use crate::github::mock::MockHost;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn registry_with(host: MockHost) -> (ActionRegistry, Arc<MockHost>) {
        let host = Arc::new(host);
        let cache = MetadataCache::new(Arc::new(MemoryStore::new()));
        let resolver = ActionResolver::new(host.clone(), cache);
        (ActionRegistry::new(resolver), host)
    }

    #[tokio::test]
    async fn test_populate_initial_seeds_loaded() {
        let host = MockHost::new()
            .with_file("actions", "checkout", "action.yaml", "name: Checkout")
            .with_repo("actions", "checkout", json!({"stargazers_count": 1}))
            .with_repo("actions", "setup-node", json!({}))
            .with_repo("actions", "setup-python", json!({}));
        let (mut registry, _) = registry_with(host);

        registry.populate_initial().await.unwrap();

        assert_eq!(registry.standard().len(), 2);
        assert_eq!(registry.recommended().len(), 3);
        assert_eq!(registry.loaded().await.len(), 5);
        assert_eq!(registry.standard()[0].id, "_shell/bash");
    }

    #[tokio::test]
    async fn test_get_returns_loaded_instance() {
        let host = MockHost::new()
            .with_file("acme", "tool", "action.yaml", "name: Tool")
            .with_repo("acme", "tool", json!({}));
        let (registry, host) = registry_with(host);

        let first = registry.get("acme/tool@v1").await.unwrap();
        let second = registry.get("acme/tool@v1").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(host.file_fetches("acme", "tool", "action.yaml"), 1);
        assert_eq!(registry.loaded().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_after_populate_reuses_instances() {
        let host = MockHost::new()
            .with_file("actions", "checkout", "action.yaml", "name: Checkout")
            .with_repo("actions", "checkout", json!({}))
            .with_repo("actions", "setup-node", json!({}))
            .with_repo("actions", "setup-python", json!({}));
        let (mut registry, host) = registry_with(host);

        registry.populate_initial().await.unwrap();
        let fetches_after_populate = host.total_fetches();

        let bash = registry.get("_shell/bash").await.unwrap();
        let checkout = registry.get("actions/checkout@v2").await.unwrap();

        assert!(Arc::ptr_eq(&bash, &registry.standard()[0]));
        assert!(Arc::ptr_eq(&checkout, &registry.recommended()[0]));
        assert_eq!(host.total_fetches(), fetches_after_populate);
    }

    #[tokio::test]
    async fn test_unresolvable_recommended_stays_usable() {
        // No descriptors served at all: every recommended action soft-fails
        // into an unenriched-but-present state.
        let host = MockHost::new()
            .with_repo("actions", "checkout", json!({}))
            .with_repo("actions", "setup-node", json!({}))
            .with_repo("actions", "setup-python", json!({}));
        let (mut registry, _) = registry_with(host);

        registry.populate_initial().await.unwrap();

        let checkout = &registry.recommended()[0];
        assert_eq!(checkout.id, "actions/checkout@v2");
        assert!(checkout.urls.is_none());
    }
}
