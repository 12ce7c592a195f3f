//! Filesystem layer for Agent Vault
//!
//! Provides the archive repository layout, atomic I/O helpers, content
//! checksums, and the change-aware directory mirror used by the backup and
//! restore engines.

pub mod checksum;
pub mod error;
pub mod io;
pub mod layout;
pub mod mirror;

pub use error::{Error, Result};
pub use layout::{ArchiveLayout, validate_agent_id};
pub use mirror::mirror;
