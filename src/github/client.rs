//! GitHub API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::RepoHost;
use crate::config::GithubConfig;
use crate::error::{Error, Result};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum seconds we are willing to sleep on a rate-limit signal.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// GitHub REST API client implementing [`RepoHost`].
///
/// Rate-limit responses are retried at most once, honoring the
/// `Retry-After` header when present.
pub struct GithubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Build a client from configuration.
    pub fn new(config: &GithubConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("actionsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout defaults: {}", e);
                Client::new()
            });

        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if is_rate_limited(&response) {
            let wait = retry_after_secs(&response).min(MAX_RETRY_AFTER_SECS);
            warn!(url, wait, "Rate limited by host, retrying once");
            tokio::time::sleep(Duration::from_secs(wait)).await;

            let mut retry = self
                .client
                .get(url)
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = &self.token {
                retry = retry.bearer_auth(token);
            }
            return Ok(retry.send().await?);
        }

        Ok(response)
    }
}

fn is_rate_limited(response: &Response) -> bool {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    // GitHub signals primary rate limits as 403 with a zeroed remaining quota.
    status == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "0")
            .unwrap_or(false)
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

#[async_trait]
impl RepoHost for GithubClient {
    async fn file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/contents/{}", self.api_url, owner, repo, path);
        debug!(url, "Fetching file content");

        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Host(format!(
                "Fetching {}/{}/{} failed with status {}",
                owner,
                repo,
                path,
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        match body.get("content").and_then(Value::as_str) {
            Some(content) => Ok(Some(content.to_string())),
            None => Err(Error::Host(format!(
                "Contents payload for {}/{}/{} carries no content field",
                owner, repo, path
            ))),
        }
    }

    async fn repository(&self, owner: &str, repo: &str) -> Result<Value> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, repo);
        debug!(url, "Fetching repository");

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(Error::Host(format!(
                "Fetching repository {}/{} failed with status {}",
                owner,
                repo,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
