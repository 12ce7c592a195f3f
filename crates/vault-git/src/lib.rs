//! Git abstraction for the Agent Vault archive repository
//!
//! Wraps the archive repository behind an explicit handle whose operations
//! take the repository root as a constructor parameter; nothing here mutates
//! process-wide state such as the current working directory.

pub mod commits;
pub mod error;
pub mod repository;

pub use commits::CommitInfo;
pub use error::{Error, Result};
pub use repository::ArchiveRepo;
