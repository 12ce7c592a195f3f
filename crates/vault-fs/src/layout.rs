//! Archive repository layout
//!
//! One directory per agent id under `archives/`, each holding a metadata
//! file and two mirrored subtrees:
//!
//! ```text
//! <root>/archives/<agent-id>/agent.json
//! <root>/archives/<agent-id>/workspace/
//! <root>/archives/<agent-id>/agentDir/
//! ```
//!
//! All path derivation goes through [`ArchiveLayout`] so backup and restore
//! cannot drift in how they construct archive paths.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Directory under the archive root holding all per-agent archives
pub const ARCHIVES_DIR: &str = "archives";

/// Per-agent metadata file name
pub const METADATA_FILE: &str = "agent.json";

/// Per-agent mirrored workspace subtree
pub const WORKSPACE_DIR: &str = "workspace";

/// Per-agent mirrored agent directory subtree
pub const AGENT_STATE_DIR: &str = "agentDir";

/// Validate that an agent id is safe for use as a directory component.
///
/// Rejects empty ids, path separators, and dot traversal.
pub fn validate_agent_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidAgentId {
            message: "agent id must not be empty".to_string(),
        });
    }
    if id == "." || id == ".." {
        return Err(Error::InvalidAgentId {
            message: format!("agent id must not be '{}'", id),
        });
    }
    if id.contains('/') || id.contains('\\') {
        return Err(Error::InvalidAgentId {
            message: format!("agent id must not contain path separators: {}", id),
        });
    }
    Ok(())
}

/// Path derivation for the archive repository.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    /// Archive repository root
    root: PathBuf,
}

impl ArchiveLayout {
    /// Create a layout rooted at the archive repository root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The archive repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `archives/` directory holding all agent archives.
    pub fn archives_root(&self) -> PathBuf {
        self.root.join(ARCHIVES_DIR)
    }

    /// The archive directory for one agent.
    pub fn agent_root(&self, id: &str) -> Result<PathBuf> {
        validate_agent_id(id)?;
        Ok(self.archives_root().join(id))
    }

    /// The metadata file for one agent.
    pub fn metadata_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.agent_root(id)?.join(METADATA_FILE))
    }

    /// The mirrored workspace subtree for one agent.
    pub fn workspace_dir(&self, id: &str) -> Result<PathBuf> {
        Ok(self.agent_root(id)?.join(WORKSPACE_DIR))
    }

    /// The mirrored agent directory subtree for one agent.
    pub fn agent_state_dir(&self, id: &str) -> Result<PathBuf> {
        Ok(self.agent_root(id)?.join(AGENT_STATE_DIR))
    }

    /// Enumerate agent ids with an archive directory, sorted by name.
    ///
    /// Non-directory entries under `archives/` are ignored.
    pub fn list_agent_ids(&self) -> Result<Vec<String>> {
        let archives = self.archives_root();
        if !archives.is_dir() {
            return Err(Error::NotADirectory { path: archives });
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&archives).map_err(|e| Error::io(&archives, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&archives, e))?;
            let path = entry.path();
            if path.is_dir()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                ids.push(name.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }
}
