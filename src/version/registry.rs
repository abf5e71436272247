//! Collaborator traits for the package registry and the release host

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::{PackageMetadata, RepositoryRef};

/// Trait for fetching package metadata from a versioned-package registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the latest published version and repository URL of a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "@types/node")
    ///
    /// # Returns
    /// * `Ok(PackageMetadata)` - Latest version (if any) and repository URL (if any)
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_package(&self, package_name: &str) -> Result<PackageMetadata, RegistryError>;

    /// Generic registry-hosted page for a package, used when no releases page exists
    fn package_page_url(&self, package_name: &str) -> String;
}

/// Trait for checking whether a source repository publishes releases
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Returns true if the repository has at least one release
    async fn has_releases(&self, repository: &RepositoryRef) -> Result<bool, RegistryError>;
}
