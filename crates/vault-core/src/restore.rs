//! Restore orchestration
//!
//! Disaster recovery from the archive repository back to live agent
//! directories. Restore is destructive by design: archived trees replace
//! the live trees wholesale. Because archived agent directories can carry
//! credential files, the engine scans every agent's archive for them
//! before touching anything and refuses the whole run unless the caller
//! explicitly confirmed the overwrite. The refusal happens before the
//! first mutation, so an unconfirmed run restores zero agents.

use serde::Serialize;

use vault_fs::ArchiveLayout;
use vault_git::ArchiveRepo;

use crate::archive::ArchiveMetadata;
use crate::config::RunConfig;
use crate::sealing::{decrypt_tree, find_file_by_name};
use crate::{Error, Result};

/// File name that marks an archive as credential-bearing
const AUTH_PROFILE_FILE: &str = "auth-profiles.json";

/// Caller choices for one restore run.
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Commit-ish to check out before restoring; `None` restores the
    /// current state of the archive repository
    pub reference: Option<String>,

    /// Acknowledge that restoring will overwrite live credential files
    pub confirm_auth_overwrite: bool,
}

/// Run-level outcome of one restore run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    /// Whether every archived agent was restored
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Number of agents restored
    pub restored: usize,
    /// Per-agent errors, in archive order
    pub errors: Vec<String>,
    /// Set when the run was refused pending credential-overwrite
    /// confirmation
    pub auth_overwrite_warning: bool,
}

impl RestoreResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            restored: 0,
            errors: Vec::new(),
            auth_overwrite_warning: false,
        }
    }
}

/// Drives one restore run across all archived agents.
pub struct RestoreEngine<'a> {
    config: &'a RunConfig,
    options: RestoreOptions,
}

impl<'a> RestoreEngine<'a> {
    pub fn new(config: &'a RunConfig, options: RestoreOptions) -> Self {
        Self { config, options }
    }

    /// Execute the run. Never returns `Err`: every outcome, including
    /// refusals and precondition failures, is reported through
    /// [`RestoreResult`].
    pub fn run(&self) -> RestoreResult {
        match self.try_run() {
            Ok(result) => result,
            Err(e) => RestoreResult::failure(e.to_string()),
        }
    }

    fn try_run(&self) -> Result<RestoreResult> {
        if !self.config.archive_root.is_dir() {
            return Err(Error::ArchiveRootNotFound {
                path: self.config.archive_root.clone(),
            });
        }

        let layout = ArchiveLayout::new(&self.config.archive_root);
        if !layout.archives_root().is_dir() {
            return Err(Error::ArchivesNotFound {
                path: layout.archives_root(),
            });
        }

        if let Some(reference) = &self.options.reference {
            let repo = ArchiveRepo::open(&self.config.archive_root)?;
            repo.checkout(reference)?;
            tracing::info!(reference, "archive checked out for restore");
        }

        let ids = layout.list_agent_ids()?;

        // Credential scan across every agent before the first mutation.
        // An unconfirmed run must restore nothing, not fail partway.
        if !self.options.confirm_auth_overwrite {
            for id in &ids {
                let agent_state = layout.agent_state_dir(id)?;
                if find_file_by_name(&agent_state, AUTH_PROFILE_FILE)?.is_some() {
                    tracing::warn!(agent = %id, "credential file present in archive");
                    return Ok(RestoreResult {
                        success: false,
                        message: format!(
                            "Archive for agent '{}' contains {}; restoring would overwrite \
                             live credentials. Re-run with credential overwrite confirmed.",
                            id, AUTH_PROFILE_FILE
                        ),
                        restored: 0,
                        errors: Vec::new(),
                        auth_overwrite_warning: true,
                    });
                }
            }
        }

        let mut restored = 0;
        let mut errors = Vec::new();
        for id in &ids {
            match self.restore_agent(&layout, id) {
                Ok(()) => restored += 1,
                Err(e) => {
                    tracing::warn!(agent = %id, error = %e, "agent restore failed");
                    errors.push(format!("{}: {}", id, e));
                }
            }
        }

        let success = errors.is_empty();
        let message = if success {
            format!("Restore complete: {} agent(s) restored", restored)
        } else {
            format!(
                "Restore finished with errors: {} restored, {} failed",
                restored,
                errors.len()
            )
        };

        Ok(RestoreResult {
            success,
            message,
            restored,
            errors,
            auth_overwrite_warning: false,
        })
    }

    /// Restore one agent to the destinations recorded in its metadata.
    ///
    /// Each archived subtree is restored only when it exists: a backup run
    /// that failed after the metadata write leaves an archive with
    /// `agent.json` alone, and such an agent is a clean skip, not an error.
    /// The encrypted agent directory is mirrored to the live destination
    /// first and decrypted there, leaving the archived ciphertext
    /// untouched.
    fn restore_agent(&self, layout: &ArchiveLayout, id: &str) -> Result<()> {
        let metadata = ArchiveMetadata::read(layout, id)?;

        let workspace_src = layout.workspace_dir(id)?;
        if workspace_src.is_dir() {
            let workspace_dst = self.config.resolve_agent_path(&metadata.binding.workspace);
            vault_fs::mirror(&workspace_src, &workspace_dst)?;
        }

        let agent_dir_src = layout.agent_state_dir(id)?;
        if agent_dir_src.is_dir() {
            let agent_dir_dst = self.config.resolve_agent_path(&metadata.binding.agent_dir);
            vault_fs::mirror(&agent_dir_src, &agent_dir_dst)?;
            decrypt_tree(&agent_dir_dst, &self.config.passphrase)?;
        }

        tracing::info!(agent = %id, "agent restored");
        Ok(())
    }
}
