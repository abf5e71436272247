use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to run audit tool: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Audit tool exited with {code:?} and no output: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}
