//! Backup and restore orchestration engine for Agent Vault
//!
//! Drives scheduled, versioned, encrypted backup and disaster-recovery
//! restore of per-agent state directories into a git-tracked archive
//! repository. Per-agent failures are isolated: one agent's error is
//! recorded on its change entry and never aborts siblings. Run-level
//! outcomes are returned as structured results, never thrown past the
//! orchestrator boundary.

pub mod archive;
pub mod backup;
pub mod config;
pub mod error;
pub mod restore;
pub mod sealing;

pub use archive::ArchiveMetadata;
pub use backup::{BackupChange, BackupEngine, BackupResult};
pub use config::RunConfig;
pub use error::{Error, Result};
pub use restore::{RestoreEngine, RestoreOptions, RestoreResult};
