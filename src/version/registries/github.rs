//! GitHub Releases API implementation

use crate::config::DEFAULT_GITHUB_API_URL;
use crate::version::error::RegistryError;
use crate::version::registry::ReleaseHost;
use crate::version::types::RepositoryRef;
use serde::de::IgnoredAny;
use tracing::warn;

/// Release host implementation for GitHub Releases API
pub struct GitHubReleases {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubReleases {
    /// Creates a new GitHubReleases client with a custom base URL
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("package-monitor")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }
}

impl Default for GitHubReleases {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_API_URL, crate::config::github_token())
    }
}

#[async_trait::async_trait]
impl ReleaseHost for GitHubReleases {
    async fn has_releases(&self, repository: &RepositoryRef) -> Result<bool, RegistryError> {
        // One release is enough to prove the listing is non-empty
        let url = format!(
            "{}/repos/{}/releases?per_page=1",
            self.base_url,
            repository.slug()
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repository.slug()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let releases: Vec<IgnoredAny> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(!releases.is_empty())
    }
}
