//! History command implementation

use std::path::Path;

use colored::Colorize;

use vault_core::RunConfig;
use vault_git::ArchiveRepo;

use crate::error::Result;

/// Run the history command: list recent backup commits.
pub fn run_history(config_path: Option<&Path>, count: usize, json: bool) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let repo = ArchiveRepo::open(&config.archive_root)?;
    let commits = repo.history(count)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&commits)?);
        return Ok(());
    }

    if commits.is_empty() {
        println!("No backups recorded yet.");
        return Ok(());
    }

    for commit in &commits {
        println!(
            "{} {} {}",
            commit.hash.yellow(),
            commit
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            commit.message
        );
    }

    Ok(())
}
