//! Error types for roster discovery

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during roster discovery
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error spawning the roster command
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster command exited with non-zero status
    #[error("Roster command failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code from the subprocess
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// Roster output was not a valid JSON binding list
    #[error("Failed to parse roster output: {0}")]
    Parse(#[from] serde_json::Error),
}
