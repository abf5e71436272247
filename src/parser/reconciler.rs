//! Resolves installed versions from package.json and yarn.lock
//!
//! Order, first non-empty result wins:
//! 1. yarn.lock: exact `name@range` key, else any entry with the same name
//! 2. package.json: declared ranges with the range operator stripped
//! 3. nothing

use tracing::{debug, warn};

use crate::parser::package_json::parse_declared_dependencies;
use crate::parser::types::{DependencyMap, DependencySource, ResolvedDependencies};
use crate::parser::yarn_lock::YarnLock;
use crate::version::semver::normalize_version;

/// Build the installed-version map for a project
///
/// Never fails: an unreadable manifest yields an empty result with source
/// `none`, an unreadable lockfile falls through to the manifest ranges.
pub fn reconcile(lockfile: Option<&str>, manifest: Option<&str>) -> ResolvedDependencies {
    let Some(manifest) = manifest else {
        debug!("No package.json, nothing to resolve");
        return ResolvedDependencies::none();
    };

    let declared = match parse_declared_dependencies(manifest) {
        Ok(declared) => declared,
        Err(e) => {
            warn!("Failed to parse package.json: {}", e);
            return ResolvedDependencies::none();
        }
    };

    if let Some(lockfile) = lockfile {
        match YarnLock::parse(lockfile) {
            Ok(lock) => {
                let resolved = resolve_from_lockfile(&declared, &lock);
                if !resolved.is_empty() {
                    return ResolvedDependencies {
                        dependencies: resolved,
                        source: DependencySource::Lockfile,
                    };
                }
                debug!("yarn.lock matched no declared dependency, using package.json");
            }
            Err(e) => warn!("Failed to parse yarn.lock file: {}", e),
        }
    }

    let resolved: DependencyMap = declared
        .iter()
        .map(|(name, range)| (name.clone(), normalize_version(range).to_string()))
        .collect();

    if resolved.is_empty() {
        return ResolvedDependencies::none();
    }

    ResolvedDependencies {
        dependencies: resolved,
        source: DependencySource::Manifest,
    }
}

/// Declared packages that have an entry in the lockfile, in declaration order.
///
/// The name-only fallback can bind a package to a version resolved for a
/// different range elsewhere in the tree (e.g. a transitive `lodash@^3`).
fn resolve_from_lockfile(declared: &DependencyMap, lock: &YarnLock) -> DependencyMap {
    declared
        .iter()
        .filter_map(|(name, range)| {
            let key = format!("{}@{}", name, range);
            let version = lock.get(&key).or_else(|| {
                let fallback = lock.find_by_name(name);
                if fallback.is_some() {
                    debug!("No exact yarn.lock entry for {}, matched by name", key);
                }
                fallback
            })?;
            Some((name.clone(), version.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{ "dependencies": { "lodash": "^4.17.0" } }"#;

    fn entries(resolved: &ResolvedDependencies) -> Vec<(&str, &str)> {
        resolved
            .dependencies
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn reconcile_uses_manifest_ranges_without_lockfile() {
        let result = reconcile(None, Some(MANIFEST));

        assert_eq!(result.source, DependencySource::Manifest);
        assert_eq!(entries(&result), vec![("lodash", "4.17.0")]);
    }

    #[test]
    fn reconcile_uses_exact_lockfile_entry() {
        let lockfile = "lodash@^4.17.0:\n  version \"4.17.21\"\n";

        let result = reconcile(Some(lockfile), Some(MANIFEST));

        assert_eq!(result.source, DependencySource::Lockfile);
        assert_eq!(entries(&result), vec![("lodash", "4.17.21")]);
    }

    #[test]
    fn reconcile_falls_back_to_name_match_in_lockfile() {
        let manifest = r#"{
  "dependencies": { "@babel/core": "^7.20.0" },
  "devDependencies": { "typescript": "~5.3.0" }
}"#;
        let lockfile = r#""@babel/core@^7.12.0":
  version "7.23.2"

typescript@~5.3.0:
  version "5.3.3"
"#;

        let result = reconcile(Some(lockfile), Some(manifest));

        assert_eq!(result.source, DependencySource::Lockfile);
        assert_eq!(
            entries(&result),
            vec![("@babel/core", "7.23.2"), ("typescript", "5.3.3")]
        );
    }

    #[test]
    fn reconcile_omits_declared_packages_missing_from_lockfile() {
        let manifest = r#"{ "dependencies": { "lodash": "^4.17.0", "axios": "^1.0.0" } }"#;
        let lockfile = "lodash@^4.17.0:\n  version \"4.17.21\"\n";

        let result = reconcile(Some(lockfile), Some(manifest));

        assert_eq!(result.source, DependencySource::Lockfile);
        assert_eq!(entries(&result), vec![("lodash", "4.17.21")]);
    }

    #[test]
    fn reconcile_degrades_to_manifest_when_lockfile_is_malformed() {
        let result = reconcile(Some("<<<<<<< HEAD\nconflict"), Some(MANIFEST));

        assert_eq!(result.source, DependencySource::Manifest);
        assert_eq!(entries(&result), vec![("lodash", "4.17.0")]);
    }

    #[test]
    fn reconcile_degrades_to_manifest_when_lockfile_has_no_match() {
        let lockfile = "react@^18.0.0:\n  version \"18.2.0\"\n";

        let result = reconcile(Some(lockfile), Some(MANIFEST));

        assert_eq!(result.source, DependencySource::Manifest);
    }

    #[test]
    fn reconcile_returns_none_without_manifest() {
        let lockfile = "lodash@^4.17.0:\n  version \"4.17.21\"\n";

        let result = reconcile(Some(lockfile), None);

        assert_eq!(result, ResolvedDependencies::none());
    }

    #[test]
    fn reconcile_returns_none_for_invalid_or_empty_manifest() {
        assert_eq!(
            reconcile(None, Some("not json")),
            ResolvedDependencies::none()
        );
        assert_eq!(
            reconcile(None, Some(r#"{ "name": "bare" }"#)),
            ResolvedDependencies::none()
        );
    }
}
