//! Restore command implementation

use std::path::Path;

use colored::Colorize;

use vault_core::{RestoreEngine, RestoreOptions, RestoreResult, RunConfig};

use crate::error::{CliError, Result};

/// Run the restore command.
pub fn run_restore(
    config_path: Option<&Path>,
    sha: Option<String>,
    confirm_auth_overwrite: bool,
    json: bool,
) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let options = RestoreOptions {
        reference: sha,
        confirm_auth_overwrite,
    };

    let result = RestoreEngine::new(&config, options).run();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if !result.success {
        return Err(CliError::run_failed(result.message));
    }
    Ok(())
}

fn print_result(result: &RestoreResult) {
    if result.auth_overwrite_warning {
        println!("{} {}", "REFUSED".yellow().bold(), result.message);
        println!(
            "Re-run with {} to proceed.",
            "--confirm-auth-overwrite".cyan()
        );
        return;
    }

    for error in &result.errors {
        println!("   {} {}", "!".red(), error);
    }

    if result.success {
        println!("{} {}", "OK".green().bold(), result.message);
    } else {
        println!("{} {}", "FAILED".red().bold(), result.message);
    }
}
