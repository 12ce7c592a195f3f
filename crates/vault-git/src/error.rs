//! Error types for vault-git

/// Result type for vault-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Reference not found: {reference}")]
    ReferenceNotFound { reference: String },

    #[error("Commit failed: {message}")]
    CommitFailed { message: String },

    #[error(transparent)]
    Git(#[from] git2::Error),
}
