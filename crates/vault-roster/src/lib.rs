//! Agent roster discovery for Agent Vault
//!
//! Wraps the external roster command as a capability interface and performs
//! required-field validation once at the boundary, so downstream code never
//! re-checks binding shape.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{CommandRoster, RosterSource};
pub use error::{Error, Result};
pub use types::{AgentBinding, partition_valid};
