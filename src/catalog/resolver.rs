//! Action resolution.
//!
//! Turns a bare `owner/repo[@ref]` reference into a populated [`Action`] by
//! fetching the repository's descriptor file and stats, going through the
//! [`MetadataCache`] so each repository is fetched at most once.
//!
//! A missing or unparseable descriptor is a soft failure: the action stays
//! usable in the graph with empty metadata, and the problem is reported
//! through the diagnostic log.

use std::collections::HashMap;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::cache::{file_key, repo_key, MetadataCache};
use super::types::{
    marketplace_slug, parse_reference, Action, ActionInput, ActionOutput, ActionStats, ActionUrls,
    PortType,
};
use crate::error::Result;
use crate::github::RepoHost;

/// Descriptor filenames tried in order.
const DESCRIPTOR_PATHS: [&str; 2] = ["action.yaml", "action.yml"];

/// Resolves action references against a repository host, memoizing through
/// the metadata cache.
pub struct ActionResolver {
    host: Arc<dyn RepoHost>,
    cache: MetadataCache,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ActionResolver {
    /// Create a resolver over the given host and cache.
    pub fn new(host: Arc<dyn RepoHost>, cache: MetadataCache) -> Self {
        Self {
            host,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an action.
    ///
    /// Already-resolved actions and built-in pseudo-actions are returned
    /// unchanged. Malformed references are fatal; descriptor problems are
    /// soft and leave the action unenriched.
    pub async fn resolve(&self, mut action: Action) -> Result<Action> {
        if action.is_resolved() || action.is_builtin() {
            return Ok(action);
        }

        let (owner, repo) = parse_reference(&action.id)?;
        let (owner, repo) = (owner.to_string(), repo.to_string());
        let file_key = file_key(&owner, &repo);
        let repo_key = repo_key(&owner, &repo);

        // Descriptor first. The per-key gate serializes concurrent
        // resolutions of the same repository: the first caller fetches and
        // populates the cache, the rest find it filled.
        if !self.cache.contains(&file_key).await {
            let gate = self.gate(&file_key).await;
            let _guard = gate.lock().await;

            if !self.cache.contains(&file_key).await {
                let encoded = match self.fetch_descriptor(&owner, &repo).await {
                    Some(encoded) => encoded,
                    None => {
                        warn!(
                            "Could not load action.yaml or action.yml for {}",
                            action.id
                        );
                        return Ok(action);
                    }
                };

                let descriptor = match decode_descriptor(&encoded) {
                    Ok(descriptor) => descriptor,
                    Err(reason) => {
                        warn!("Unable to parse descriptor for {}: {}", action.id, reason);
                        return Ok(action);
                    }
                };

                self.cache.insert(file_key.clone(), descriptor).await?;
            }
        }

        // Repository stats, once per repository.
        if !self.cache.contains(&repo_key).await {
            let gate = self.gate(&repo_key).await;
            let _guard = gate.lock().await;

            if !self.cache.contains(&repo_key).await {
                let payload = self.host.repository(&owner, &repo).await?;
                self.cache.insert(repo_key.clone(), payload).await?;
            }
        }

        let descriptor = self.cache.get(&file_key).await.unwrap_or(Value::Null);
        populate_from_descriptor(&mut action, &descriptor, &owner, &repo);

        if let Some(repo_payload) = self.cache.get(&repo_key).await {
            action.stats = Some(ActionStats {
                stars: repo_payload
                    .get("stargazers_count")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
                issues: repo_payload
                    .get("open_issues")
                    .and_then(Value::as_u64)
                    .unwrap_or(0),
            });
        }

        debug!(action = %action.id, "Resolved action");
        Ok(action)
    }

    async fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        let mut gates = self.in_flight.lock().await;
        gates.entry(key.to_string()).or_default().clone()
    }

    async fn fetch_descriptor(&self, owner: &str, repo: &str) -> Option<String> {
        for path in DESCRIPTOR_PATHS {
            match self.host.file_content(owner, repo, path).await {
                Ok(Some(content)) => return Some(content),
                Ok(None) => continue,
                Err(e) => {
                    warn!("Fetching {}/{}/{} failed: {}", owner, repo, path, e);
                    continue;
                }
            }
        }
        None
    }
}

/// Decode a base64 contents payload and parse it as a YAML descriptor,
/// normalized to JSON for caching.
fn decode_descriptor(encoded: &str) -> std::result::Result<Value, String> {
    let stripped: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(stripped)
        .map_err(|e| format!("invalid base64: {}", e))?;
    let text = String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))?;
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| format!("invalid YAML: {}", e))?;
    serde_json::to_value(yaml).map_err(|e| format!("unrepresentable YAML: {}", e))
}

/// Populate name, description, URLs, and port lists from a cached
/// descriptor payload. Absent sections yield empty lists.
fn populate_from_descriptor(action: &mut Action, descriptor: &Value, owner: &str, repo: &str) {
    action.name = descriptor
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    action.description = descriptor
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let marketplace = match &action.name {
        Some(name) => format!(
            "https://github.com/marketplace/actions/{}",
            marketplace_slug(name)
        ),
        None => String::new(),
    };
    action.urls = Some(ActionUrls {
        marketplace,
        repo: format!("https://github.com/{}/{}", owner, repo),
    });

    action.inputs = Some(
        descriptor
            .get("inputs")
            .and_then(Value::as_object)
            .map(|inputs| {
                inputs
                    .iter()
                    .map(|(id, entry)| ActionInput {
                        port_type: PortType::Input,
                        id: id.clone(),
                        description: field_str(entry, "description"),
                        required: entry
                            .get("required")
                            .and_then(Value::as_bool)
                            .unwrap_or(false),
                        default: field_str(entry, "default"),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    );

    action.outputs = Some(
        descriptor
            .get("outputs")
            .and_then(Value::as_object)
            .map(|outputs| {
                outputs
                    .iter()
                    .map(|(id, entry)| ActionOutput {
                        port_type: PortType::Output,
                        id: id.clone(),
                        description: field_str(entry, "description"),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    );
}

fn field_str(entry: &Value, field: &str) -> String {
    entry.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
