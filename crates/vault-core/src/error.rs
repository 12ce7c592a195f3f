//! Error types for vault-core

use std::path::PathBuf;

/// Result type for vault-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// No config path given and no home directory to derive one from
    #[error("Could not determine a default configuration path")]
    NoConfigPath,

    /// Required environment variable missing or empty
    #[error("Environment variable {name} is not set")]
    MissingEnv { name: &'static str },

    /// Archive repository root does not exist
    #[error("Archive repository not found at {path}")]
    ArchiveRootNotFound { path: PathBuf },

    /// Archive repository has no archives/ directory
    #[error("No archives directory under {path}")]
    ArchivesNotFound { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from vault-fs
    #[error(transparent)]
    Fs(#[from] vault_fs::Error),

    /// Cipher error from vault-crypto
    #[error(transparent)]
    Crypto(#[from] vault_crypto::Error),

    /// Git error from vault-git
    #[error(transparent)]
    Git(#[from] vault_git::Error),

    /// Roster discovery error from vault-roster
    #[error(transparent)]
    Roster(#[from] vault_roster::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
