//! Reading a project's dependency files from disk

use std::io::ErrorKind;
use std::path::Path;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::monitor::project::ExtractedFiles;

pub const MANIFEST_FILE: &str = "package.json";
pub const LOCKFILE_FILE: &str = "yarn.lock";

/// Trait for reading the manifest and lockfile of a project directory
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FileExtractor: Send + Sync {
    /// Missing or unreadable files come back as None
    async fn read_project_files(&self, project_path: &Path) -> ExtractedFiles;
}

/// Reads the files straight from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsExtractor;

#[async_trait::async_trait]
impl FileExtractor for FsExtractor {
    async fn read_project_files(&self, project_path: &Path) -> ExtractedFiles {
        let (manifest, lockfile) = tokio::join!(
            read_optional(project_path, MANIFEST_FILE),
            read_optional(project_path, LOCKFILE_FILE)
        );

        ExtractedFiles { manifest, lockfile }
    }
}

async fn read_optional(dir: &Path, file_name: &str) -> Option<String> {
    let path = dir.join(file_name);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{:?} not found", path);
            None
        }
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}
