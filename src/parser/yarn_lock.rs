//! yarn.lock (v1) parser
//!
//! Only the pieces the reconciler needs are kept: every `name@range` spec of
//! an entry header maps to the entry's resolved `version`.

use indexmap::IndexMap;

use crate::parser::traits::ParseError;

/// A parsed yarn.lock: `name@range` key -> resolved version, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YarnLock {
    entries: IndexMap<String, String>,
}

impl YarnLock {
    /// Parse yarn.lock content
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut entries = IndexMap::new();
        let mut current: Option<PendingEntry> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_end();

            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            if !line.starts_with(' ') && !line.starts_with('\t') {
                if let Some(entry) = current.take() {
                    entry.finish(&mut entries)?;
                }
                current = Some(PendingEntry::from_header(line, line_no)?);
                continue;
            }

            let Some(entry) = current.as_mut() else {
                return Err(ParseError::InvalidSyntax {
                    line: line_no,
                    message: "indented line outside of an entry".to_string(),
                });
            };

            // Only direct children of the entry carry the version; nested
            // blocks (dependencies, optionalDependencies) are skipped
            if indentation(raw_line) > entry.body_indent(raw_line) {
                continue;
            }

            if let Some(version) = parse_version_field(line.trim_start()) {
                entry.version = Some(version);
            }
        }

        if let Some(entry) = current.take() {
            entry.finish(&mut entries)?;
        }

        Ok(Self { entries })
    }

    /// Exact lookup by `name@range` key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Version of the last entry whose package-name component equals `name`
    ///
    /// Ignores the range component, so the result may belong to a different
    /// declared range than the caller's.
    pub fn find_by_name(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| package_name_of(key) == name)
            .map(|(_, version)| version.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Package-name component of a `name@range` key
///
/// `lodash@^4.17.0` -> `lodash`, `@babel/core@^7.0.0` -> `@babel/core`
pub fn package_name_of(key: &str) -> &str {
    match key.rfind('@') {
        Some(index) if index > 0 => &key[..index],
        _ => key,
    }
}

struct PendingEntry {
    keys: Vec<String>,
    line: usize,
    version: Option<String>,
    indent: Option<usize>,
}

impl PendingEntry {
    fn from_header(line: &str, line_no: usize) -> Result<Self, ParseError> {
        let Some(specs) = line.strip_suffix(':') else {
            return Err(ParseError::InvalidSyntax {
                line: line_no,
                message: format!("expected entry header ending with ':', found {:?}", line),
            });
        };

        let keys: Vec<String> = specs
            .split(',')
            .map(|spec| spec.trim().trim_matches('"').to_string())
            .collect();

        if keys.iter().any(|key| key.is_empty()) {
            return Err(ParseError::InvalidSyntax {
                line: line_no,
                message: "empty package spec in entry header".to_string(),
            });
        }

        Ok(Self {
            keys,
            line: line_no,
            version: None,
            indent: None,
        })
    }

    /// Indentation of the entry's direct children, fixed by its first body line
    fn body_indent(&mut self, raw_line: &str) -> usize {
        *self.indent.get_or_insert_with(|| indentation(raw_line))
    }

    fn finish(self, entries: &mut IndexMap<String, String>) -> Result<(), ParseError> {
        let Some(version) = self.version else {
            return Err(ParseError::InvalidSyntax {
                line: self.line,
                message: format!("entry {} has no version", self.keys.join(", ")),
            });
        };

        for key in self.keys {
            entries.insert(key, version.clone());
        }
        Ok(())
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// `version "1.2.3"` (v1) or `version: 1.2.3` (berry)
fn parse_version_field(line: &str) -> Option<String> {
    let rest = line.strip_prefix("version")?;
    if !rest.starts_with([' ', ':', '\t']) {
        return None;
    }
    let value = rest
        .trim_start_matches(':')
        .trim()
        .trim_matches('"')
        .to_string();
    (!value.is_empty()).then_some(value)
}
