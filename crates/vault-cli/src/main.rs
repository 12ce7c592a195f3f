//! Agent Vault CLI
//!
//! The command-line interface for backing up and restoring agent state.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Backup { json }) => commands::run_backup(config_path, json),
        Some(Commands::Restore {
            sha,
            confirm_auth_overwrite,
            json,
        }) => commands::run_restore(config_path, sha, confirm_auth_overwrite, json),
        Some(Commands::History { count, json }) => commands::run_history(config_path, count, json),
        None => {
            // No command provided - show help hint
            println!("{} Agent Vault CLI", "agentvault".green().bold());
            println!();
            println!(
                "Run {} for available commands.",
                "agentvault --help".cyan()
            );
            Ok(())
        }
    }
}
