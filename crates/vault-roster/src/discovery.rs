//! Roster discovery via an external command
//!
//! The roster source is modeled as a capability interface so the backup
//! engine does not care whether bindings come from a subprocess, a library
//! call, or a test stub.

use std::path::PathBuf;
use std::process::Command;

use crate::types::AgentBinding;
use crate::{Error, Result};

/// Capability interface: something that can produce the agent roster.
pub trait RosterSource {
    /// Discover the current agent bindings, in roster order.
    fn discover(&self) -> Result<Vec<AgentBinding>>;
}

/// Roster source backed by an external command whose stdout is a JSON array
/// of agent bindings.
#[derive(Debug, Clone)]
pub struct CommandRoster {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandRoster {
    /// Create a roster source invoking `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Run the command from a specific working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl RosterSource for CommandRoster {
    fn discover(&self) -> Result<Vec<AgentBinding>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(program = %self.program, "invoking roster command");
        let output = cmd.output().map_err(Error::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(Error::CommandFailed { code, stderr });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let bindings: Vec<AgentBinding> = serde_json::from_str(stdout.trim())?;
        Ok(bindings)
    }
}
