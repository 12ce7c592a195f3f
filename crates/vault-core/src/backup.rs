//! Backup orchestration
//!
//! One backup run: discover the agent roster, mirror each valid agent's
//! workspace and agent directory into its archive, encrypt the archived
//! agent directory, refresh metadata, and close the run with exactly one
//! version-control commit. Per-agent failures are captured on that agent's
//! change record and never abort siblings; commit failure is a distinct
//! run-level outcome even when all per-agent work succeeded.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use vault_fs::ArchiveLayout;
use vault_git::ArchiveRepo;
use vault_roster::{AgentBinding, RosterSource, partition_valid};

use crate::archive::ArchiveMetadata;
use crate::config::RunConfig;
use crate::sealing::sync_encrypted_tree;
use crate::Result;

/// Per-agent outcome of one backup run.
///
/// Emitted exactly once per processed agent; on internal failure the error
/// field is set and the record is still emitted, never dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupChange {
    /// Agent identifier
    pub id: String,
    /// Whether the archived workspace subtree changed
    pub workspace_changed: bool,
    /// Whether the archived agent directory subtree changed
    pub agent_dir_changed: bool,
    /// Error that interrupted this agent's backup, if any
    pub error: Option<String>,
}

impl BackupChange {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            workspace_changed: false,
            agent_dir_changed: false,
            error: None,
        }
    }

    /// Whether at least one archived subtree changed.
    pub fn changed(&self) -> bool {
        self.workspace_changed || self.agent_dir_changed
    }
}

/// Run-level outcome of one backup run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResult {
    /// Whether the run as a whole succeeded (discovery and commit)
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Number of valid agents processed
    pub processed: usize,
    /// Per-agent outcomes, in roster order
    pub changes: Vec<BackupChange>,
    /// Run-level error detail, if any
    pub error: Option<String>,
}

impl BackupResult {
    fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed: 0,
            changes: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether any per-agent entry carries an error.
    pub fn has_agent_errors(&self) -> bool {
        self.changes.iter().any(|c| c.error.is_some())
    }
}

/// Drives one backup run across all discovered agents.
pub struct BackupEngine<'a, R: RosterSource> {
    config: &'a RunConfig,
    roster: &'a R,
}

impl<'a, R: RosterSource> BackupEngine<'a, R> {
    /// Create an engine over an already-validated run configuration.
    pub fn new(config: &'a RunConfig, roster: &'a R) -> Self {
        Self { config, roster }
    }

    /// Execute the run. Never returns `Err`: every outcome, including
    /// run-level failures, is reported through [`BackupResult`].
    pub fn run(&self) -> BackupResult {
        let bindings = match self.roster.discover() {
            Ok(bindings) => bindings,
            Err(e) => {
                return BackupResult::failure("Agent discovery failed", e.to_string());
            }
        };

        let valid = partition_valid(bindings);
        tracing::info!(agents = valid.len(), "starting backup run");

        let layout = ArchiveLayout::new(&self.config.archive_root);
        if let Err(e) = std::fs::create_dir_all(&self.config.archive_root) {
            return BackupResult::failure("Could not create archive repository root", e.to_string());
        }
        let repo = match ArchiveRepo::open_or_init(&self.config.archive_root) {
            Ok(repo) => repo,
            Err(e) => {
                return BackupResult::failure("Could not open archive repository", e.to_string());
            }
        };

        let mut changes = Vec::with_capacity(valid.len());
        for binding in &valid {
            changes.push(self.process_agent(&layout, binding));
        }

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let commit_message = format!("Backup: {}", timestamp);
        if let Err(e) = repo.commit_all(&commit_message) {
            // Per-agent work already landed on disk; surface this as its
            // own failure mode rather than folding it into agent errors.
            return BackupResult {
                success: false,
                message: format!(
                    "Per-agent backup completed ({} agent(s)) but the archive commit failed",
                    valid.len()
                ),
                processed: valid.len(),
                changes,
                error: Some(e.to_string()),
            };
        }

        let changed = changes.iter().filter(|c| c.changed()).count();
        let failed = changes.iter().filter(|c| c.error.is_some()).count();
        let message = if failed > 0 {
            format!(
                "Backup complete: {} agent(s) processed, {} with changes, {} failed",
                valid.len(),
                changed,
                failed
            )
        } else {
            format!(
                "Backup complete: {} agent(s) processed, {} with changes",
                valid.len(),
                changed
            )
        };

        BackupResult {
            success: true,
            message,
            processed: valid.len(),
            changes,
            error: None,
        }
    }

    /// Back up one agent, capturing any failure on its change record.
    fn process_agent(&self, layout: &ArchiveLayout, binding: &AgentBinding) -> BackupChange {
        let mut change = BackupChange::new(&binding.id);

        if let Err(e) = self.try_process_agent(layout, binding, &mut change) {
            tracing::warn!(agent = %binding.id, error = %e, "agent backup failed");
            change.error = Some(e.to_string());
        }

        change
    }

    fn try_process_agent(
        &self,
        layout: &ArchiveLayout,
        binding: &AgentBinding,
        change: &mut BackupChange,
    ) -> Result<()> {
        // Metadata first, with a fresh timestamp regardless of content
        // changes: the timestamp is the record that this agent was checked
        // on this run.
        let metadata = ArchiveMetadata::new(binding.clone());
        metadata.write(layout)?;

        let workspace_src = self.config.resolve_agent_path(&binding.workspace);
        let workspace_dst = layout.workspace_dir(&binding.id)?;
        change.workspace_changed = vault_fs::mirror(&workspace_src, &workspace_dst)?;

        let agent_dir_src = self.config.resolve_agent_path(&binding.agent_dir);
        let agent_dir_dst = layout.agent_state_dir(&binding.id)?;
        change.agent_dir_changed =
            sync_encrypted_tree(&agent_dir_src, &agent_dir_dst, &self.config.passphrase)?;

        Ok(())
    }
}
