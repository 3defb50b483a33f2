//! Configuration management.
//!
//! actionsmith configuration can come from:
//! - Environment variables (ACTIONSMITH_*)
//! - Config file (~/.config/actionsmith/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// actionsmith configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Repository host configuration
    #[serde(default)]
    pub github: GithubConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Repository host (GitHub API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Personal access token. Unauthenticated requests work but are
    /// rate-limited aggressively by the host.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the workflow and cache blobs
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    pub fn load() -> Self {
        let mut config = Self::default();

        let path = Self::config_dir().join("config.toml");
        if let Some(parsed) = Self::load_from_path(&path) {
            config = parsed;
        }

        config.apply_env_overrides();
        config
    }

    /// Get the data directory.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("actionsmith"))
            .unwrap_or_else(|| PathBuf::from(".actionsmith"))
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("actionsmith"))
            .unwrap_or_else(|| PathBuf::from(".actionsmith"))
    }

    /// Resolve the database path, falling back to the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("actionsmith.db"))
    }

    fn load_from_path(path: &Path) -> Option<Config> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring unparseable config at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ACTIONSMITH_API_URL") {
            self.github.api_url = url;
        }
        if let Ok(token) = std::env::var("ACTIONSMITH_TOKEN") {
            self.github.token = Some(token);
        } else if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Ok(timeout) = std::env::var("ACTIONSMITH_TIMEOUT_SECONDS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.github.timeout_seconds = parsed;
            }
        }
        if let Ok(path) = std::env::var("ACTIONSMITH_DATABASE_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.github.timeout_seconds, 30);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[github]
api_url = "https://github.example.com/api/v3"
token = "ghp_test"

[storage]
database_path = "/tmp/test.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/test.db"))
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[github]\ntoken = \"t\"\n").unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.storage.database_path.is_none());
    }
}
