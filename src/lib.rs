//! actionsmith - core engine for a visual GitHub Actions workflow builder.
//!
//! A workflow is assembled from reusable action building blocks: steps bound
//! to resolved actions, wired together by directed connections between their
//! input and output ports. This crate owns the two hard pieces behind that
//! canvas:
//!
//! - the **graph compiler**, which topologically orders steps, synthesizes
//!   `${{ steps.<id>.outputs.<id> }}` data-flow expressions for every wire,
//!   and serializes a valid workflow YAML document, and
//! - the **action resolver**, which turns `owner/repo@ref` references into
//!   structured metadata (inputs, outputs, stats) fetched from the
//!   repository host, behind a persistent cache so every repository is
//!   fetched at most once.
//!
//! The canvas UI, storage medium, and HTTP transport stay behind the
//! [`storage::BlobStore`] and [`github::RepoHost`] ports.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use actionsmith::catalog::{ActionRegistry, ActionResolver, MetadataCache};
//! use actionsmith::config::Config;
//! use actionsmith::github::GithubClient;
//! use actionsmith::storage::{BlobStore, SqliteStore};
//! use actionsmith::workflow::{compile, Workflow};
//!
//! # async fn demo() -> actionsmith::Result<()> {
//! let config = Config::load();
//! let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::open(&config.database_path())?);
//! let cache = MetadataCache::new(store.clone());
//! cache.load().await;
//!
//! let host = Arc::new(GithubClient::new(&config.github));
//! let registry = ActionRegistry::new(ActionResolver::new(host, cache));
//!
//! let checkout = registry.get("actions/checkout@v2").await?;
//! let mut workflow = Workflow::new();
//! workflow.add(&checkout);
//! println!("{}", compile(&workflow)?);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod github;
pub mod storage;
pub mod telemetry;
pub mod workflow;

pub use error::{Error, Result};
