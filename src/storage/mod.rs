//! Persistent blob storage for the workflow and the metadata cache.
//!
//! The core never assumes a storage medium: both the workflow blob and the
//! action metadata cache go through the [`BlobStore`] port. Writers replace a
//! blob wholesale; readers treat corrupt data as absent.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Blob key under which the workflow is persisted.
pub const WORKFLOW_KEY: &str = "workflow";

/// Blob key under which the action metadata cache is persisted.
pub const ACTION_CACHE_KEY: &str = "action_cache";

/// Key-value blob storage port.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Retrieve a blob by key. Absent keys yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a blob, replacing any previous value wholesale.
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}
