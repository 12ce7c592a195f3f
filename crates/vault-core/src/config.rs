//! Run configuration
//!
//! The archive repository root comes from a JSON config file; the
//! encryption passphrase and the workspace root come from environment
//! variables. Absence of any of the three is a fatal precondition for a
//! run, never a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable holding the encryption passphrase
pub const PASSPHRASE_ENV: &str = "AGENT_VAULT_PASSPHRASE";

/// Environment variable holding the workspace root used to resolve
/// relative binding paths
pub const WORKSPACE_ROOT_ENV: &str = "AGENT_VAULT_WORKSPACE_ROOT";

/// Default config location under the home directory
const DEFAULT_CONFIG_DIR: &str = ".agentvault";
const CONFIG_FILE: &str = "config.json";

/// Default roster command, overridable from the config file
fn default_roster_command() -> Vec<String> {
    vec![
        "agentctl".to_string(),
        "bindings".to_string(),
        "--json".to_string(),
    ]
}

/// On-disk shape of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    /// Archive repository root
    archive_root: String,

    /// Command producing the agent roster as JSON on stdout
    #[serde(default = "default_roster_command")]
    roster_command: Vec<String>,
}

/// Fully resolved configuration for one backup or restore run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Archive repository root
    pub archive_root: PathBuf,

    /// Workspace root used to resolve relative agent paths
    pub workspace_root: PathBuf,

    /// Encryption passphrase for archived agent state
    pub passphrase: String,

    /// Roster command (program followed by arguments)
    pub roster_command: Vec<String>,
}

impl RunConfig {
    /// Load configuration from the given config file (or the default
    /// location) plus the required environment variables.
    ///
    /// # Errors
    ///
    /// Fails before any agent is touched when the config file is missing
    /// or either environment variable is unset or empty.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path().ok_or(Error::NoConfigPath)?,
        };

        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }

        let file: ConfigFile = vault_fs::io::read_json(&path)?;
        let passphrase = required_env(PASSPHRASE_ENV)?;
        let workspace_root = PathBuf::from(required_env(WORKSPACE_ROOT_ENV)?);

        Ok(Self {
            archive_root: PathBuf::from(file.archive_root),
            workspace_root,
            passphrase,
            roster_command: file.roster_command,
        })
    }

    /// Build a configuration directly, bypassing file and environment
    /// lookup. Intended for embedding and tests.
    pub fn from_parts(
        archive_root: impl Into<PathBuf>,
        workspace_root: impl Into<PathBuf>,
        passphrase: impl Into<String>,
        roster_command: Vec<String>,
    ) -> Self {
        Self {
            archive_root: archive_root.into(),
            workspace_root: workspace_root.into(),
            passphrase: passphrase.into(),
            roster_command,
        }
    }

    /// Resolve an agent-supplied path against the workspace root.
    ///
    /// Absolute paths pass through unchanged.
    pub fn resolve_agent_path(&self, path: &str) -> PathBuf {
        let candidate = PathBuf::from(path);
        if candidate.is_absolute() {
            candidate
        } else {
            self.workspace_root.join(candidate)
        }
    }
}

/// Read a required environment variable; empty counts as missing.
fn required_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingEnv { name }),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_config_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let result = RunConfig::load(Some(&path));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn resolve_agent_path_relative_and_absolute() {
        let config = RunConfig::from_parts("/archive", "/workspaces", "pw", vec![]);

        assert_eq!(
            config.resolve_agent_path("main/ws"),
            PathBuf::from("/workspaces/main/ws")
        );
        assert_eq!(
            config.resolve_agent_path("/abs/path"),
            PathBuf::from("/abs/path")
        );
    }

    // Environment mutation is process-global, so everything touching the
    // two required variables lives in this single test.
    #[test]
    fn load_reads_file_and_environment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"archiveRoot": "/tmp/archive", "rosterCommand": ["stub", "--json"]}"#,
        )
        .unwrap();

        unsafe {
            std::env::set_var(PASSPHRASE_ENV, "secret");
            std::env::set_var(WORKSPACE_ROOT_ENV, "/tmp/workspaces");
        }

        let config = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(config.archive_root, PathBuf::from("/tmp/archive"));
        assert_eq!(config.workspace_root, PathBuf::from("/tmp/workspaces"));
        assert_eq!(config.passphrase, "secret");
        assert_eq!(config.roster_command, vec!["stub", "--json"]);

        unsafe {
            std::env::remove_var(PASSPHRASE_ENV);
        }
        let result = RunConfig::load(Some(&path));
        assert!(matches!(
            result,
            Err(Error::MissingEnv {
                name: PASSPHRASE_ENV
            })
        ));

        unsafe {
            std::env::remove_var(WORKSPACE_ROOT_ENV);
        }
    }

    #[test]
    fn roster_command_defaults_when_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"archiveRoot": "/tmp/archive"}"#).unwrap();

        let file: ConfigFile = vault_fs::io::read_json(&path).unwrap();
        assert_eq!(file.roster_command[0], "agentctl");
    }
}
