//! Archive metadata records
//!
//! One `agent.json` per archived agent, overwritten wholesale on every
//! backup run. History of the metadata comes from the surrounding git
//! commits, not from the file itself. The record's `workspace`/`agentDir`
//! fields are the authoritative restore destinations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vault_fs::ArchiveLayout;
use vault_roster::AgentBinding;

use crate::Result;

/// Metadata persisted at `archives/<id>/agent.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveMetadata {
    /// Full copy of the agent binding at backup time
    #[serde(flatten)]
    pub binding: AgentBinding,

    /// When this agent was last backed up (UTC, set at write time)
    pub backed_up_at: DateTime<Utc>,
}

impl ArchiveMetadata {
    /// Create metadata for a binding with a fresh timestamp.
    pub fn new(binding: AgentBinding) -> Self {
        Self {
            binding,
            backed_up_at: Utc::now(),
        }
    }

    /// Write this record to the agent's metadata path, creating parent
    /// directories as needed.
    pub fn write(&self, layout: &ArchiveLayout) -> Result<()> {
        let path = layout.metadata_path(&self.binding.id)?;
        vault_fs::io::write_json_pretty(&path, self)?;
        Ok(())
    }

    /// Read the record for one archived agent.
    pub fn read(layout: &ArchiveLayout, id: &str) -> Result<Self> {
        let path = layout.metadata_path(id)?;
        Ok(vault_fs::io::read_json(&path)?)
    }
}
