// Research stage - gathers topical findings before screenwriting
use super::graph::NodeFunction;
use super::state::{StateUpdate, WorkflowState};
use crate::agent::{AgentRuntime, ScriptAgent};
use crate::prompts::{build_agent_prompt, build_task_prompt};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Substituted when the researcher agent returns no text. Downstream treats
/// this as usable input, not a failure.
pub const NO_RESEARCH_RESULTS: &str = "No research results";

pub struct ResearchNode {
    runtime: Arc<AgentRuntime>,
}

impl ResearchNode {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl NodeFunction for ResearchNode {
    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate, String> {
        tracing::info!("🔎 Research node: {}", state.topic);

        let vars: HashMap<&str, String> = HashMap::from([
            ("topic", state.topic.clone()),
            ("tones", state.tones.clone()),
            ("file_path", state.file_path.clone()),
            ("current_year", state.current_year.clone()),
        ]);

        let system_prompt = format!(
            "{}\n{}",
            build_agent_prompt(&self.runtime.prompts.agents.researcher, &vars),
            build_task_prompt(&self.runtime.prompts.tasks.research_task, &vars),
        );

        let agent = ScriptAgent::new(
            self.runtime.openai.clone(),
            self.runtime.registry.tools_for("researcher"),
            self.runtime.tools.clone(),
            "researcher",
        );

        let user_message = format!(
            "Research the topic: {} with tones: {}",
            state.topic, state.tones
        );
        let output = agent
            .run(&system_prompt, &user_message)
            .await
            .map_err(|e| e.to_string())?;

        let research_results = if output.trim().is_empty() {
            tracing::warn!("Researcher agent produced no output");
            NO_RESEARCH_RESULTS.to_string()
        } else {
            output
        };

        Ok(StateUpdate::new()
            .with_research_results(research_results)
            .with_needs_more_research(false)
            .with_research_attempts(state.research_attempts + 1))
    }
}
