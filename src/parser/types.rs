//! Common types for parsers

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Package name -> version string, in manifest declaration order
pub type DependencyMap = IndexMap<String, String>;

/// Which file the resolved versions were taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencySource {
    /// Exact versions from yarn.lock
    Lockfile,
    /// Declared ranges from package.json (lockfile missing, invalid or unmatched)
    Manifest,
    /// No usable dependency information
    None,
}

impl DependencySource {
    /// Returns the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencySource::Lockfile => "lockfile",
            DependencySource::Manifest => "manifest",
            DependencySource::None => "none",
        }
    }

    /// Provenance line shown next to an update list
    pub fn describe(&self) -> &'static str {
        match self {
            DependencySource::Lockfile => "Dependency information sourced from yarn.lock file.",
            DependencySource::Manifest => {
                "Dependency information sourced from package.json file (yarn.lock not found or invalid)."
            }
            DependencySource::None => {
                "No valid dependency information found. Please ensure your project has a yarn.lock or package.json file."
            }
        }
    }
}

impl std::fmt::Display for DependencySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installed-version map plus its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependencies {
    pub dependencies: DependencyMap,
    pub source: DependencySource,
}

impl ResolvedDependencies {
    pub fn none() -> Self {
        Self {
            dependencies: DependencyMap::new(),
            source: DependencySource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}
