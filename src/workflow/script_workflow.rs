// Script generation workflow - research then screenwrite, with a bounded
// loop back into research when the screenwriter asks for it
use super::executor::{ExecutorConfig, WorkflowExecutor};
use super::graph::{NodeFunction, NodeType, StateGraph, StateGraphBuilder};
use super::research::ResearchNode;
use super::router::research_loop_router;
use super::screenwrite::{ScreenwriteNode, NO_SCRIPT_GENERATED};
use super::state::{Platform, StateUpdate, WorkflowState, WorkflowStatus};
use crate::agent::AgentRuntime;
use async_trait::async_trait;
use std::sync::Arc;

/// Total research passes allowed per run: the initial pass plus at most two
/// loop-backs. Keeps a model that keeps emitting the research marker from
/// cycling forever.
pub const MAX_RESEARCH_PASSES: u32 = 3;

/// Inputs for one workflow run.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub topic: String,
    pub tones: String,
    pub file_path: String,
    pub current_year: Option<String>,
    pub platform: Platform,
}

/// Terminal node.
struct CompleteNode;

#[async_trait]
impl NodeFunction for CompleteNode {
    async fn execute(&self, _state: &WorkflowState) -> Result<StateUpdate, String> {
        Ok(StateUpdate::new().with_status(WorkflowStatus::Completed))
    }
}

/// Build the two-stage graph with its conditional loop edge.
pub fn build_script_graph(runtime: Arc<AgentRuntime>) -> Result<StateGraph, String> {
    StateGraphBuilder::new()
        .add_node(
            "research",
            NodeType::Agent,
            Arc::new(ResearchNode::new(runtime.clone())),
            "Gathers topical findings with web search",
        )
        .add_node(
            "screenwrite",
            NodeType::Agent,
            Arc::new(ScreenwriteNode::new(runtime)),
            "Writes the script from the research",
        )
        .add_node(
            "complete",
            NodeType::End,
            Arc::new(CompleteNode),
            "Terminal state",
        )
        .set_entry_point("research")
        .add_edge("research", "screenwrite")
        .add_conditional_edge("screenwrite", research_loop_router(MAX_RESEARCH_PASSES))
        .build()
}

/// Run the workflow and return the finished script.
pub async fn run_script_workflow(
    runtime: Arc<AgentRuntime>,
    request: ScriptRequest,
) -> Result<String, String> {
    let state = run_script_workflow_with_state(runtime, request, |_, _| {}).await?;
    if state.final_script.is_empty() {
        Ok(NO_SCRIPT_GENERATED.to_string())
    } else {
        Ok(state.final_script)
    }
}

/// Run the workflow and return the full final state. `observer` fires after
/// each node completes, which lets a streaming caller surface intermediate
/// research results.
pub async fn run_script_workflow_with_state<F>(
    runtime: Arc<AgentRuntime>,
    request: ScriptRequest,
    observer: F,
) -> Result<WorkflowState, String>
where
    F: FnMut(&WorkflowState, &str) + Send,
{
    let graph = build_script_graph(runtime)?;
    let executor = WorkflowExecutor::new(graph, ExecutorConfig::default());

    let state = WorkflowState::new(
        request.topic,
        request.tones,
        request.file_path,
        request.current_year,
        request.platform,
    );

    executor.run_with_observer(state, observer).await
}
