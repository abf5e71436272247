//! package.json parser

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::parser::traits::ParseError;
use crate::parser::types::DependencyMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<IndexMap<String, serde_json::Value>>,
    #[serde(default)]
    dev_dependencies: Option<IndexMap<String, serde_json::Value>>,
}

/// Parse the direct dependencies declared in a package.json
///
/// `dependencies` and `devDependencies` are merged; a package declared in both
/// keeps its position but takes the `devDependencies` range. Entries whose
/// range is not a string are skipped.
pub fn parse_declared_dependencies(content: &str) -> Result<DependencyMap, ParseError> {
    let manifest: PackageJson =
        serde_json::from_str(content).map_err(|e| ParseError::ParseFailed(e.to_string()))?;

    let mut declared = DependencyMap::new();
    let sections = [manifest.dependencies, manifest.dev_dependencies];

    for section in sections.into_iter().flatten() {
        for (name, range) in section {
            match range {
                serde_json::Value::String(range) => {
                    declared.insert(name, range);
                }
                other => debug!("Skipping {} with non-string range {}", name, other),
            }
        }
    }

    Ok(declared)
}
