//! Update aggregation: compares installed versions against the registry

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::monitor::priority::PrioritySet;
use crate::monitor::project::ExtractedFiles;
use crate::parser::{DependencyMap, DependencySource, reconcile};
use crate::version::lookup::PackageLookup;
use crate::version::semver::{normalize_version, version_distance};

/// A dependency whose installed version differs from the latest one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyUpdate {
    pub package: String,
    pub current_version: String,
    pub latest_version: String,
    pub doc_url: String,
    pub is_priority: bool,
    pub distance: i64,
}

/// Outdated dependencies split into the priority and non-priority groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedReport {
    pub source: DependencySource,
    pub priority: Vec<DependencyUpdate>,
    pub other: Vec<DependencyUpdate>,
}

impl OutdatedReport {
    /// Partition updates (already ordered by distance) keeping their order
    pub fn from_updates(source: DependencySource, updates: Vec<DependencyUpdate>) -> Self {
        let (priority, other) = updates.into_iter().partition(|update| update.is_priority);
        Self {
            source,
            priority,
            other,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_empty() && self.other.is_empty()
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.other.len()
    }
}

/// Look up every dependency and collect the ones with a newer version.
///
/// Lookups run concurrently, each started `FETCH_STAGGER_DELAY_MS` after the
/// previous one. Unavailable packages are left out. The result is ordered by
/// distance, largest first.
pub async fn compute_updates(
    lookup: &PackageLookup,
    dependencies: &DependencyMap,
    priority: &PrioritySet,
) -> Vec<DependencyUpdate> {
    let futures = dependencies
        .iter()
        .enumerate()
        .map(|(i, (package, version))| {
            let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
            async move {
                sleep(delay).await;
                let current_version = normalize_version(version);
                let Some(info) = lookup.lookup(package).await else {
                    return None;
                };

                if info.latest_version == current_version {
                    return None;
                }

                Some(DependencyUpdate {
                    package: package.clone(),
                    current_version: current_version.to_string(),
                    distance: version_distance(current_version, &info.latest_version),
                    latest_version: info.latest_version,
                    doc_url: info.doc_url,
                    is_priority: priority.contains(package),
                })
            }
        });

    let mut updates: Vec<DependencyUpdate> = join_all(futures).await.into_iter().flatten().collect();
    updates.sort_by(|a, b| b.distance.cmp(&a.distance));

    debug!(
        "Found {} updates among {} dependencies",
        updates.len(),
        dependencies.len()
    );
    updates
}

/// Reconcile the project's files and compute its outdated report
pub async fn analyze_outdated(
    lookup: &PackageLookup,
    files: &ExtractedFiles,
    priority: &PrioritySet,
) -> OutdatedReport {
    let resolved = reconcile(files.lockfile.as_deref(), files.manifest.as_deref());
    info!(
        "Checking {} dependencies from {}",
        resolved.dependencies.len(),
        resolved.source
    );

    let updates = compute_updates(lookup, &resolved.dependencies, priority).await;
    OutdatedReport::from_updates(resolved.source, updates)
}
