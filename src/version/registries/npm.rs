//! npm registry API implementation

use std::collections::HashMap;

use crate::config::DEFAULT_NPM_REGISTRY_URL;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::semver::find_semantic_max;
use crate::version::types::PackageMetadata;
use serde::Deserialize;
use tracing::warn;

/// Public package page shown when no releases page is available
const PACKAGE_PAGE_BASE_URL: &str = "https://www.npmjs.com/package";

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
    #[serde(default)]
    repository: Option<NpmRepository>,
}

/// `repository` is either a bare string or an object with a `url`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NpmRepository {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

impl NpmRepository {
    fn into_url(self) -> Option<String> {
        match self {
            NpmRepository::Url(url) => Some(url),
            NpmRepository::Object { url } => url,
        }
        .filter(|url| !url.trim().is_empty())
    }
}

/// Registry implementation for npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("package-monitor")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NPM_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_package(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);

        let response = self.client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        // dist-tag "latest" first, semantic max of published versions otherwise
        let latest_version = package_info
            .dist_tags
            .get("latest")
            .cloned()
            .or_else(|| find_semantic_max(package_info.versions.keys()));

        let repository_url = package_info.repository.and_then(NpmRepository::into_url);

        Ok(PackageMetadata::new(latest_version, repository_url))
    }

    fn package_page_url(&self, package_name: &str) -> String {
        format!("{}/{}?activeTab=versions", PACKAGE_PAGE_BASE_URL, package_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_package_prefers_dist_tag_latest() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/lodash")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "lodash",
                    "dist-tags": { "latest": "4.17.21", "next": "5.0.0-beta.1" },
                    "versions": {
                        "4.17.21": {},
                        "5.0.0-beta.1": {},
                        "4.17.20": {}
                    },
                    "repository": {
                        "type": "git",
                        "url": "git+https://github.com/lodash/lodash.git"
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package("lodash").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            PackageMetadata::new(
                Some("4.17.21".to_string()),
                Some("git+https://github.com/lodash/lodash.git".to_string())
            )
        );
    }

    #[tokio::test]
    async fn fetch_package_falls_back_to_semantic_max_without_dist_tags() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/left-pad")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "left-pad",
                    "versions": { "1.0.0": {}, "1.3.0": {}, "1.1.0": {} },
                    "repository": "github:left-pad/left-pad"
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package("left-pad").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.latest_version, Some("1.3.0".to_string()));
        assert_eq!(
            result.repository_url,
            Some("github:left-pad/left-pad".to_string())
        );
    }

    #[tokio::test]
    async fn fetch_package_returns_not_found_for_nonexistent_package() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nonexistent-package")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Not found"}"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package("nonexistent-package").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_package_handles_scoped_package() {
        let mut server = Server::new_async().await;

        // Scoped packages use URL encoding: @types/node -> @types%2Fnode
        let mock = server
            .mock("GET", "/@types%2Fnode")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "name": "@types/node", "dist-tags": { "latest": "20.0.0" } }"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package("@types/node").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, PackageMetadata::new(Some("20.0.0".to_string()), None));
    }

    #[tokio::test]
    async fn fetch_package_rejects_unparseable_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package("broken").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[test]
    fn package_page_url_points_at_versions_tab() {
        let registry = NpmRegistry::default();
        assert_eq!(
            registry.package_page_url("@types/node"),
            "https://www.npmjs.com/package/@types/node?activeTab=versions"
        );
    }
}
