//! Normalized vulnerability model

use std::fmt;

use serde::{Serialize, Serializer};

/// Advisory severity, ordered from most to least severe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
    /// Any label outside the ranked set (e.g. "info"), kept verbatim
    Unranked(String),
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "moderate" => Severity::Moderate,
            "low" => Severity::Low,
            _ => Severity::Unranked(label.to_string()),
        }
    }

    /// Sort rank; lower is more severe and unranked labels come last
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Moderate => 2,
            Severity::Low => 3,
            Severity::Unranked(_) => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Unranked(label) => label,
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advisory affecting the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VulnerabilityRecord {
    pub title: String,
    pub severity: Severity,
    /// Affected package
    pub package: String,
    /// Installed version of the affected package
    pub current_version: String,
    /// Version range containing the fix
    pub patched_in: String,
    /// Direct dependency through which the package is pulled in
    pub dependency_of: String,
    /// Full `a>b>c` dependency path
    pub path: String,
    pub more_info: String,
}

/// Stable sort, most severe first; equal severities keep discovery order
pub fn sort_by_severity(records: &mut [VulnerabilityRecord]) {
    records.sort_by_key(|record| record.severity.rank());
}
