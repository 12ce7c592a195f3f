//! Command implementations for vault-cli

pub mod backup;
pub mod history;
pub mod restore;

pub use backup::run_backup;
pub use history::run_history;
pub use restore::run_restore;
