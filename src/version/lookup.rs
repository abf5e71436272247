//! Latest-version and documentation URL lookup with graceful degradation

use std::sync::Arc;

use tracing::{debug, warn};

use crate::version::registry::{Registry, ReleaseHost};
use crate::version::types::{PackageInfo, RepositoryRef};

/// Combines a package registry with a release host.
///
/// Every failure degrades: a registry failure makes the package unavailable,
/// a release-host failure falls back to the registry's package page.
#[derive(Clone)]
pub struct PackageLookup {
    registry: Arc<dyn Registry>,
    releases: Arc<dyn ReleaseHost>,
}

impl PackageLookup {
    pub fn new(registry: Arc<dyn Registry>, releases: Arc<dyn ReleaseHost>) -> Self {
        Self { registry, releases }
    }

    /// Latest version and documentation URL, or None if unavailable
    pub async fn lookup(&self, package_name: &str) -> Option<PackageInfo> {
        let metadata = self
            .registry
            .fetch_package(package_name)
            .await
            .inspect_err(|e| warn!("Failed to fetch info for {}: {}", package_name, e))
            .ok()?;

        let Some(latest_version) = metadata.latest_version else {
            debug!("Registry reports no latest version for {}", package_name);
            return None;
        };

        let doc_url = self
            .doc_url(package_name, metadata.repository_url.as_deref())
            .await;

        Some(PackageInfo {
            latest_version,
            doc_url,
        })
    }

    /// Releases page when the repository has releases, registry page otherwise
    async fn doc_url(&self, package_name: &str, repository_url: Option<&str>) -> String {
        if let Some(repository) = repository_url.and_then(RepositoryRef::from_url) {
            match self.releases.has_releases(&repository).await {
                Ok(true) => return repository.releases_page(),
                Ok(false) => debug!("{} has no releases", repository.slug()),
                Err(e) => warn!(
                    "Failed to check releases for {}: {}",
                    repository.slug(),
                    e
                ),
            }
        }

        self.registry.package_page_url(package_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::error::RegistryError;
    use crate::version::registry::{MockRegistry, MockReleaseHost};
    use crate::version::types::PackageMetadata;

    fn registry_returning(metadata: PackageMetadata) -> MockRegistry {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .times(1)
            .returning(move |_| Ok(metadata.clone()));
        registry
            .expect_package_page_url()
            .returning(|name| format!("https://registry.test/{}", name));
        registry
    }

    #[tokio::test]
    async fn lookup_uses_releases_page_when_releases_exist() {
        let registry = registry_returning(PackageMetadata::new(
            Some("1.7.2".to_string()),
            Some("git+https://github.com/axios/axios.git".to_string()),
        ));
        let mut releases = MockReleaseHost::new();
        releases
            .expect_has_releases()
            .withf(|repo| repo.slug() == "axios/axios")
            .times(1)
            .returning(|_| Ok(true));

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));
        let result = lookup.lookup("axios").await;

        assert_eq!(
            result,
            Some(PackageInfo {
                latest_version: "1.7.2".to_string(),
                doc_url: "https://github.com/axios/axios/releases".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn lookup_falls_back_to_registry_page_without_releases() {
        let registry = registry_returning(PackageMetadata::new(
            Some("2.0.0".to_string()),
            Some("git@github.com:some/repo.git".to_string()),
        ));
        let mut releases = MockReleaseHost::new();
        releases.expect_has_releases().returning(|_| Ok(false));

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));
        let result = lookup.lookup("some-pkg").await.unwrap();

        assert_eq!(result.doc_url, "https://registry.test/some-pkg");
    }

    #[tokio::test]
    async fn lookup_falls_back_to_registry_page_when_release_check_fails() {
        let registry = registry_returning(PackageMetadata::new(
            Some("2.0.0".to_string()),
            Some("https://github.com/some/repo".to_string()),
        ));
        let mut releases = MockReleaseHost::new();
        releases
            .expect_has_releases()
            .returning(|_| Err(RegistryError::RateLimited {
                retry_after_secs: None,
            }));

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));
        let result = lookup.lookup("some-pkg").await.unwrap();

        assert_eq!(result.latest_version, "2.0.0");
        assert_eq!(result.doc_url, "https://registry.test/some-pkg");
    }

    #[tokio::test]
    async fn lookup_skips_release_check_for_non_github_repository() {
        let registry = registry_returning(PackageMetadata::new(
            Some("0.3.0".to_string()),
            Some("https://gitlab.com/foo/bar".to_string()),
        ));
        let mut releases = MockReleaseHost::new();
        releases.expect_has_releases().times(0);

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));
        let result = lookup.lookup("bar").await.unwrap();

        assert_eq!(result.doc_url, "https://registry.test/bar");
    }

    #[tokio::test]
    async fn lookup_is_unavailable_when_registry_fails() {
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_package()
            .returning(|name| Err(RegistryError::NotFound(name.to_string())));
        let mut releases = MockReleaseHost::new();
        releases.expect_has_releases().times(0);

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));

        assert_eq!(lookup.lookup("missing").await, None);
    }

    #[tokio::test]
    async fn lookup_is_unavailable_without_latest_version() {
        let registry = registry_returning(PackageMetadata::new(None, None));
        let releases = MockReleaseHost::new();

        let lookup = PackageLookup::new(Arc::new(registry), Arc::new(releases));

        assert_eq!(lookup.lookup("unpublished").await, None);
    }
}
