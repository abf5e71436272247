//! `yarn audit --json` output parser
//!
//! The tool prints one JSON document per line. Each line is decoded against a
//! strict schema and classified; only advisory lines become records.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::audit::types::{Severity, VulnerabilityRecord, sort_by_severity};

/// Separator between packages in a dependency path (`a>b>c`)
const PATH_SEPARATOR: char = '>';

/// Envelope shared by every line the audit tool prints
#[derive(Debug, Deserialize)]
struct AuditEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AdvisoryData {
    advisory: Advisory,
}

#[derive(Debug, Deserialize)]
struct Advisory {
    title: String,
    severity: String,
    module_name: String,
    #[serde(default)]
    patched_versions: String,
    #[serde(default)]
    url: String,
    findings: Vec<Finding>,
}

#[derive(Debug, Deserialize)]
struct Finding {
    version: String,
    paths: Vec<String>,
}

/// Classification of one output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditLine {
    /// A decoded advisory
    Advisory(VulnerabilityRecord),
    /// A well-formed event of another type (summary, info, ...), or a non-JSON line
    Ignored,
    /// A line that looked like JSON but did not match the schema
    Skipped(String),
}

/// Classify a single line of audit output
pub fn parse_audit_line(line: &str) -> AuditLine {
    let line = line.trim();
    if !line.starts_with('{') {
        return AuditLine::Ignored;
    }

    let event: AuditEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => return AuditLine::Skipped(format!("invalid JSON: {}", e)),
    };

    if event.kind != "auditAdvisory" {
        return AuditLine::Ignored;
    }

    let data: AdvisoryData = match serde_json::from_value(event.data) {
        Ok(data) => data,
        Err(e) => return AuditLine::Skipped(format!("malformed advisory: {}", e)),
    };

    match into_record(data.advisory) {
        Some(record) => AuditLine::Advisory(record),
        None => AuditLine::Skipped("advisory without findings or paths".to_string()),
    }
}

/// Extract all advisories from raw audit output, most severe first
pub fn parse_audit_output(output: &str) -> Vec<VulnerabilityRecord> {
    let mut records = Vec::new();

    for (index, line) in output.lines().enumerate() {
        match parse_audit_line(line) {
            AuditLine::Advisory(record) => records.push(record),
            AuditLine::Ignored => {}
            AuditLine::Skipped(reason) => {
                warn!("Skipping audit output line {}: {}", index + 1, reason)
            }
        }
    }

    debug!("Parsed {} advisories from audit output", records.len());
    sort_by_severity(&mut records);
    records
}

fn into_record(advisory: Advisory) -> Option<VulnerabilityRecord> {
    let finding = advisory.findings.into_iter().next()?;
    let path = finding.paths.into_iter().next()?;
    let dependency_of = path
        .split(PATH_SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string();

    Some(VulnerabilityRecord {
        title: advisory.title,
        severity: Severity::from_label(&advisory.severity),
        package: advisory.module_name,
        current_version: finding.version,
        patched_in: advisory.patched_versions,
        dependency_of,
        path,
        more_info: advisory.url,
    })
}
