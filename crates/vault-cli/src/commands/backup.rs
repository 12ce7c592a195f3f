//! Backup command implementation

use std::path::Path;

use colored::Colorize;

use vault_core::{BackupEngine, BackupResult, RunConfig};
use vault_roster::CommandRoster;

use crate::error::{CliError, Result};

/// Run the backup command.
///
/// Exits nonzero when the run fails outright or when any agent's backup
/// failed, so schedulers notice partial failures.
pub fn run_backup(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let roster = roster_from_config(&config)?;

    let result = BackupEngine::new(&config, &roster).run();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if !result.success {
        return Err(CliError::run_failed(result.message));
    }
    if result.has_agent_errors() {
        return Err(CliError::run_failed(
            "one or more agents failed to back up",
        ));
    }
    Ok(())
}

/// Build the roster source from the configured roster command.
pub fn roster_from_config(config: &RunConfig) -> Result<CommandRoster> {
    let (program, args) = config
        .roster_command
        .split_first()
        .ok_or_else(|| CliError::run_failed("roster command is empty"))?;
    Ok(CommandRoster::new(program, args.to_vec()))
}

fn print_result(result: &BackupResult) {
    println!("{} Backing up agents...", "=>".blue().bold());

    for change in &result.changes {
        match &change.error {
            Some(error) => {
                println!(
                    "   {} {}: {}",
                    "!".red(),
                    change.id.cyan(),
                    error
                );
            }
            None if change.changed() => {
                let mut parts = Vec::new();
                if change.workspace_changed {
                    parts.push("workspace");
                }
                if change.agent_dir_changed {
                    parts.push("agent dir");
                }
                println!(
                    "   {} {}: {} updated",
                    "+".green(),
                    change.id.cyan(),
                    parts.join(", ")
                );
            }
            None => {
                println!("   {} {}: unchanged", "=".dimmed(), change.id.cyan());
            }
        }
    }

    if result.success {
        println!("{} {}", "OK".green().bold(), result.message);
    } else {
        println!("{} {}", "FAILED".red().bold(), result.message);
    }
}
