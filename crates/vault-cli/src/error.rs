//! Error types for vault-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from vault-core
    #[error(transparent)]
    Core(#[from] vault_core::Error),

    /// Error from vault-git
    #[error(transparent)]
    Git(#[from] vault_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A run completed with failures; the message was already printed
    #[error("{message}")]
    RunFailed { message: String },
}

impl CliError {
    /// Mark a run as failed with the given summary.
    pub fn run_failed(message: impl Into<String>) -> Self {
        Self::RunFailed {
            message: message.into(),
        }
    }
}
