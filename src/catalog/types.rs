//! Action metadata types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reserved prefix marking built-in pseudo-actions.
pub const BUILTIN_PREFIX: &str = "_";

/// Reserved namespace for local shell pseudo-actions (`_shell/bash`, ...).
pub const SHELL_PREFIX: &str = "_shell/";

/// Kind of a step port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortType {
    /// Regular action input, bound as a named argument.
    Input,
    /// Action output.
    Output,
    /// User-declared environment variable input, bound into the step's `env`.
    EnvCustom,
}

/// A declared action input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInput {
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub id: String,
    pub description: String,
    pub default: String,
    pub required: bool,
}

/// A declared action output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutput {
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub id: String,
    pub description: String,
}

/// Marketplace and repository URLs of a resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionUrls {
    pub marketplace: String,
    pub repo: String,
}

/// Repository popularity statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub stars: u64,
    pub issues: u64,
}

/// A reusable unit of pipeline behavior.
///
/// `None` metadata means "not yet resolved"; empty lists mean "resolved,
/// none declared". The resolver treats an action with `urls` set as fully
/// resolved, which makes enrichment idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// `owner/repo[@ref]` reference, or a `_`-prefixed pseudo-action id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<ActionUrls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ActionStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<ActionInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<ActionOutput>>,
}

impl Action {
    /// Create a bare, unresolved action from a reference string.
    pub fn from_reference(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            description: None,
            urls: None,
            stats: None,
            inputs: None,
            outputs: None,
        }
    }

    /// Create an unresolved action carrying a curated name and description.
    pub fn with_summary(id: &str, name: &str, description: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            ..Self::from_reference(id)
        }
    }

    /// Create a built-in pseudo-action, fully populated at construction.
    pub fn builtin(id: &str, name: &str, description: &str) -> Self {
        Self {
            inputs: Some(Vec::new()),
            outputs: Some(Vec::new()),
            ..Self::with_summary(id, name, description)
        }
    }

    /// Whether this is a reserved built-in pseudo-action.
    pub fn is_builtin(&self) -> bool {
        self.id.starts_with(BUILTIN_PREFIX)
    }

    /// Whether the resolver has already populated this action.
    pub fn is_resolved(&self) -> bool {
        self.urls.is_some()
    }

    /// The shell kind for `_shell/*` pseudo-actions (`bash`, `python`, ...).
    pub fn shell_kind(&self) -> Option<&str> {
        self.id.strip_prefix(SHELL_PREFIX)
    }
}

/// Parse an `owner/repo[@ref]` reference into `(owner, repo)`.
///
/// A reference without a `/` is a contract violation, not a recoverable
/// condition.
pub fn parse_reference(reference: &str) -> Result<(&str, &str)> {
    let (owner, rest) = reference
        .split_once('/')
        .ok_or_else(|| Error::Reference(reference.to_string()))?;
    let repo = rest.split('@').next().unwrap_or_default();
    if owner.is_empty() || repo.is_empty() {
        return Err(Error::Reference(reference.to_string()));
    }
    Ok((owner, repo))
}

/// Slugify an action name for its marketplace URL: lowercase, with every
/// run of non-alphanumeric characters collapsed to a single `-`.
pub(crate) fn marketplace_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    slug
}
