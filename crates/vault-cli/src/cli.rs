//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Agent Vault - versioned, encrypted backups of agent state
#[derive(Parser, Debug)]
#[command(name = "agentvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: ~/.agentvault/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Back up every agent into the archive repository
    ///
    /// Discovers the agent roster, mirrors each agent's workspace and
    /// agent directory into the archive, encrypts the archived agent
    /// directory, and records the run as a single commit.
    Backup {
        /// Output the run result as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Restore every archived agent back to its live directories
    ///
    /// Overwrites the live workspace and agent directory of each archived
    /// agent with the archived state. Refuses to run when an archive
    /// contains credential files unless --confirm-auth-overwrite is given.
    Restore {
        /// Commit to restore from (any revision expression); defaults to
        /// the archive's current state
        #[arg(long, value_name = "REF")]
        sha: Option<String>,

        /// Confirm overwriting live credential files
        #[arg(long)]
        confirm_auth_overwrite: bool,

        /// Output the run result as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show recent backup commits from the archive repository
    History {
        /// Maximum number of commits to show
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Output the history as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
