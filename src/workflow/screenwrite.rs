// Screenwriting stage - turns research into the final script
use super::graph::NodeFunction;
use super::script_workflow::MAX_RESEARCH_PASSES;
use super::state::{StateUpdate, WorkflowState};
use crate::agent::{AgentRuntime, ScriptAgent};
use crate::prompts::{build_agent_prompt, build_task_prompt};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// In-band marker the screenwriter emits to request another research pass.
pub const RESEARCH_SENTINEL: &str = "[RESEARCH NEEDED]";

/// Substituted when the screenwriter agent returns no text.
pub const NO_SCRIPT_GENERATED: &str = "No script generated";

pub struct ScreenwriteNode {
    runtime: Arc<AgentRuntime>,
}

impl ScreenwriteNode {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl NodeFunction for ScreenwriteNode {
    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate, String> {
        tracing::info!("✍️ Screenwriting node: {} ({})", state.topic, state.platform);

        let vars: HashMap<&str, String> = HashMap::from([
            ("topic", state.topic.clone()),
            ("tones", state.tones.clone()),
            ("file_path", state.file_path.clone()),
            ("current_year", state.current_year.clone()),
            ("research_results", state.research_results.clone()),
            ("platform", state.platform.to_string()),
        ]);

        let system_prompt = format!(
            "{}\n{}",
            build_agent_prompt(&self.runtime.prompts.agents.screenwriter, &vars),
            build_task_prompt(&self.runtime.prompts.tasks.screenwriting_task, &vars),
        );

        let agent = ScriptAgent::new(
            self.runtime.openai.clone(),
            self.runtime.registry.tools_for("screenwriter"),
            self.runtime.tools.clone(),
            "screenwriter",
        );

        let research_results = if state.research_results.is_empty() {
            "No research available"
        } else {
            state.research_results.as_str()
        };
        let user_message = format!(
            "Create a {} script for the topic: {}\nDesired tones: {}\nResearch results: {}\nFile path for reference: {}",
            state.platform, state.topic, state.tones, research_results, state.file_path
        );

        let output = agent
            .run(&system_prompt, &user_message)
            .await
            .map_err(|e| e.to_string())?;

        let candidate = if output.trim().is_empty() {
            tracing::warn!("Screenwriter agent produced no output");
            NO_SCRIPT_GENERATED.to_string()
        } else {
            output
        };

        let can_request_research = state.research_attempts < MAX_RESEARCH_PASSES;
        let (final_script, needs_more_research) =
            evaluate_script_output(candidate, can_request_research);

        Ok(StateUpdate::new()
            .with_final_script(final_script)
            .with_needs_more_research(needs_more_research))
    }
}

/// Decide between finishing and looping based on the raw candidate text.
///
/// The sentinel marker requests another research pass, in which case the
/// partial script is discarded. Once the pass budget is spent the candidate
/// is kept as-is so the run terminates with the last available draft.
pub fn evaluate_script_output(candidate: String, can_request_research: bool) -> (String, bool) {
    if candidate.contains(RESEARCH_SENTINEL) {
        if can_request_research {
            return (String::new(), true);
        }
        tracing::warn!(
            "Screenwriter requested more research after the pass budget was spent, keeping draft"
        );
    }
    (candidate, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_discards_draft_and_requests_loop() {
        let (script, needs_more) = evaluate_script_output(
            "[RESEARCH NEEDED] need more on economy".to_string(),
            true,
        );
        assert_eq!(script, "");
        assert!(needs_more);
    }

    #[test]
    fn test_sentinel_anywhere_in_text_counts() {
        let (script, needs_more) = evaluate_script_output(
            "Draft so far...\n[RESEARCH NEEDED]\nmissing numbers".to_string(),
            true,
        );
        assert!(script.is_empty());
        assert!(needs_more);
    }

    #[test]
    fn test_clean_output_passes_through_byte_identical() {
        let raw = "Script: Rome's history...\n\n  trailing spaces kept  ".to_string();
        let (script, needs_more) = evaluate_script_output(raw.clone(), true);
        assert_eq!(script, raw);
        assert!(!needs_more);
    }

    #[test]
    fn test_exhausted_budget_keeps_last_draft() {
        let raw = "[RESEARCH NEEDED] but here is what we have".to_string();
        let (script, needs_more) = evaluate_script_output(raw.clone(), false);
        assert_eq!(script, raw);
        assert!(!needs_more);
    }

    #[test]
    fn test_loop_request_never_carries_a_script() {
        // The two outputs are mutually exclusive within one pass
        for candidate in ["[RESEARCH NEEDED]", "x [RESEARCH NEEDED] y"] {
            let (script, needs_more) = evaluate_script_output(candidate.to_string(), true);
            assert!(needs_more);
            assert!(script.is_empty());
        }
    }
}
