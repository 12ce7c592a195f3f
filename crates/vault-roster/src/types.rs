//! Agent binding records

use serde::{Deserialize, Serialize};

/// One logical agent's identity, storage paths, and routing configuration,
/// as reported by the external roster source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBinding {
    /// Agent identifier, used as the archive directory name
    #[serde(default)]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Live workspace directory
    #[serde(default)]
    pub workspace: String,

    /// Live agent state directory
    #[serde(default)]
    pub agent_dir: String,

    /// Model identifier serving this agent
    #[serde(default)]
    pub model: String,

    /// Number of bindings pointing at this agent
    #[serde(default)]
    pub bindings: u32,

    /// Whether this is the default agent
    #[serde(default)]
    pub is_default: bool,

    /// Message routes bound to this agent
    #[serde(default)]
    pub routes: Vec<String>,
}

impl AgentBinding {
    /// Required-field validity rule: `id`, `workspace`, and `agent_dir`
    /// must all be present and non-empty.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.workspace.is_empty() && !self.agent_dir.is_empty()
    }
}

/// Split a roster into valid bindings, logging a warning for each invalid
/// one. Invalid bindings are excluded from the run, never fatal to it.
pub fn partition_valid(bindings: Vec<AgentBinding>) -> Vec<AgentBinding> {
    let mut valid = Vec::with_capacity(bindings.len());

    for binding in bindings {
        if binding.is_valid() {
            valid.push(binding);
        } else {
            tracing::warn!(
                id = %binding.id,
                workspace = %binding.workspace,
                agent_dir = %binding.agent_dir,
                "skipping binding with missing required fields"
            );
        }
    }

    valid
}
