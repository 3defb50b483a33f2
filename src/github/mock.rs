//! Scripted repository host for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;

use super::RepoHost;
use crate::error::Result;

/// In-memory host serving scripted files and repository payloads, counting
/// every fetch so tests can assert the at-most-once properties.
#[derive(Default)]
pub(crate) struct MockHost {
    files: HashMap<String, String>,
    repos: HashMap<String, Value>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `yaml` (base64-encoded, as the contents API would) for
    /// `owner/repo` under the given path.
    pub fn with_file(mut self, owner: &str, repo: &str, path: &str, yaml: &str) -> Self {
        self.files
            .insert(file_key(owner, repo, path), STANDARD.encode(yaml));
        self
    }

    /// Serve a repository payload for `owner/repo`.
    pub fn with_repo(mut self, owner: &str, repo: &str, payload: Value) -> Self {
        self.repos.insert(repo_key(owner, repo), payload);
        self
    }

    /// Delay every response, widening concurrency windows in tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches of the given file path.
    pub fn file_fetches(&self, owner: &str, repo: &str, path: &str) -> usize {
        *self
            .calls
            .lock()
            .unwrap()
            .get(&file_key(owner, repo, path))
            .unwrap_or(&0)
    }

    /// Number of repository-stats fetches.
    pub fn repo_fetches(&self, owner: &str, repo: &str) -> usize {
        *self
            .calls
            .lock()
            .unwrap()
            .get(&repo_key(owner, repo))
            .unwrap_or(&0)
    }

    /// Total fetches across all endpoints.
    pub fn total_fetches(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, key: String) {
        *self.calls.lock().unwrap().entry(key).or_insert(0) += 1;
    }
}

fn file_key(owner: &str, repo: &str, path: &str) -> String {
    format!("{}/{}/{}", owner, repo, path)
}

fn repo_key(owner: &str, repo: &str) -> String {
    format!("{}/{}", owner, repo)
}

#[async_trait]
impl RepoHost for MockHost {
    async fn file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        self.record(file_key(owner, repo, path));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.files.get(&file_key(owner, repo, path)).cloned())
    }

    async fn repository(&self, owner: &str, repo: &str) -> Result<Value> {
        self.record(repo_key(owner, repo));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .repos
            .get(&repo_key(owner, repo))
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }
}
