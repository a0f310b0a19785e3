// config.rs - Agent and task template configuration
//! Loads the researcher/screenwriter personas and their task templates from
//! YAML once at startup. The loaded config is shared read-only across runs.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskProfile {
    pub description: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfigs {
    pub researcher: AgentProfile,
    pub screenwriter: AgentProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfigs {
    pub research_task: TaskProfile,
    pub screenwriting_task: TaskProfile,
}

/// Immutable prompt configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub agents: AgentConfigs,
    pub tasks: TaskConfigs,
}

impl PromptConfig {
    pub fn load(config_dir: &Path) -> Result<Self, String> {
        let agents = load_yaml(&config_dir.join("agents.yaml"))?;
        let tasks = load_yaml(&config_dir.join("tasks.yaml"))?;
        Ok(Self { agents, tasks })
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_yaml::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}
