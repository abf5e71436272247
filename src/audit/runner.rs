//! Security-audit tool invocation

use std::path::Path;

#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::{debug, info};

use crate::audit::error::AuditError;
use crate::audit::parser::parse_audit_output;
use crate::audit::types::VulnerabilityRecord;
use crate::config::AuditConfig;

/// Captured result of one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Trait for running the audit tool inside a project directory
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AuditRunner: Send + Sync {
    async fn run_audit(&self, project_path: &Path) -> Result<AuditOutput, AuditError>;
}

/// Runs the configured audit command (`yarn audit --json` by default)
pub struct CommandAuditRunner {
    program: String,
    args: Vec<String>,
}

impl CommandAuditRunner {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl Default for CommandAuditRunner {
    fn default() -> Self {
        Self::new(&AuditConfig::default())
    }
}

#[async_trait::async_trait]
impl AuditRunner for CommandAuditRunner {
    async fn run_audit(&self, project_path: &Path) -> Result<AuditOutput, AuditError> {
        debug!(
            "Running {} {:?} in {:?}",
            self.program, self.args, project_path
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_path)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(AuditOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Run the audit tool and parse its findings
///
/// The tool exits non-zero when it finds advisories; that is only a failure
/// when nothing was written to stdout.
pub async fn check_vulnerabilities(
    runner: &dyn AuditRunner,
    project_path: &Path,
) -> Result<Vec<VulnerabilityRecord>, AuditError> {
    let output = runner.run_audit(project_path).await?;

    if output.exit_code != Some(0) && output.stdout.trim().is_empty() {
        return Err(AuditError::Failed {
            code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let records = parse_audit_output(&output.stdout);
    info!(
        "Audit of {:?} found {} vulnerabilities",
        project_path,
        records.len()
    );
    Ok(records)
}
