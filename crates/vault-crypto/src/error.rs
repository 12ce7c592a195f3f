//! Error types for vault-crypto

use std::path::PathBuf;

/// Result type for vault-crypto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during payload encryption and decryption
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Artifact shorter than the fixed salt/iv/tag header
    #[error("Malformed artifact: {len} bytes is shorter than the {expected}-byte header")]
    MalformedArtifact { len: usize, expected: usize },

    /// Authentication tag did not verify. Covers both wrong-passphrase and
    /// bit-corruption; the two are indistinguishable by construction.
    #[error("Authentication failed: wrong passphrase or corrupted artifact")]
    AuthenticationFailed,

    /// Cipher-level encryption failure
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
