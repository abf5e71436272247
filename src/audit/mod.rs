//! Security-audit layer
//!
//! - [`runner`]: Runs the audit tool in a project directory
//! - [`parser`]: Turns line-delimited JSON output into vulnerability records
//! - [`types`]: Severity ranking and the vulnerability record
//! - [`error`]: Audit failures

pub mod error;
pub mod parser;
pub mod runner;
pub mod types;

pub use error::AuditError;
pub use parser::{AuditLine, parse_audit_line, parse_audit_output};
pub use runner::{AuditOutput, AuditRunner, CommandAuditRunner, check_vulnerabilities};
pub use types::{Severity, VulnerabilityRecord};
