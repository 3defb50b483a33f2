//! Repository host collaborator.
//!
//! The resolver talks to the host through the [`RepoHost`] port: fetch a file
//! from a repository (base64 payload, as the contents API returns it) and
//! fetch repository statistics. Retry behavior lives here, invisible to the
//! resolver beyond a raised failure.

mod client;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use client::GithubClient;

/// Repository host port.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Fetch a file's base64-encoded content. `Ok(None)` when the file does
    /// not exist in the repository.
    async fn file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>>;

    /// Fetch the raw repository payload (star count, open issues, ...).
    async fn repository(&self, owner: &str, repo: &str) -> Result<Value>;
}
