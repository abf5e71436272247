use std::path::PathBuf;

use thiserror::Error;

use crate::audit::AuditError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Project already added: {0}")]
    DuplicateProject(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Not a project directory: {0:?}")]
    InvalidProjectPath(PathBuf),

    #[error("Notification period must be 0 or between {min} and {max} seconds, got {value}")]
    InvalidPeriod { value: u64, min: u64, max: u64 },

    #[error("{package} is not a dependency of {project}")]
    UnknownDependency { project: String, package: String },

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
