// Executor - runs the workflow graph to a terminal state
use super::graph::StateGraph;
use super::state::{WorkflowState, WorkflowStatus};
use tokio::time::{timeout, Duration};
use tracing::{error, info};

pub struct ExecutorConfig {
    /// Hard cap on node executions per run, a backstop against runaway loops
    pub max_iterations: usize,
    /// Per-node timeout covering the agent invocation and its tool calls
    pub node_timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            node_timeout_seconds: 300,
        }
    }
}

pub struct WorkflowExecutor {
    graph: StateGraph,
    config: ExecutorConfig,
}

impl WorkflowExecutor {
    pub fn new(graph: StateGraph, config: ExecutorConfig) -> Self {
        if !graph.is_compiled() {
            panic!("Cannot create executor with uncompiled graph");
        }
        Self { graph, config }
    }

    /// Run the workflow to completion. Stage errors are not recovered here;
    /// they propagate to the caller with the state marked failed.
    pub async fn run(&self, state: WorkflowState) -> Result<WorkflowState, String> {
        self.run_with_observer(state, |_, _| {}).await
    }

    /// Run the workflow, invoking `observer` with the merged state after each
    /// node completes. Streaming callers use this to emit progress events.
    pub async fn run_with_observer<F>(
        &self,
        mut state: WorkflowState,
        mut observer: F,
    ) -> Result<WorkflowState, String>
    where
        F: FnMut(&WorkflowState, &str) + Send,
    {
        info!("🚀 Starting workflow run: {}", state.workflow_id);
        state.status = WorkflowStatus::Running;

        let mut current_node = self
            .graph
            .get_entry_point()
            .ok_or_else(|| "No entry point".to_string())?
            .clone();
        let node_timeout = Duration::from_secs(self.config.node_timeout_seconds);
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                state.status = WorkflowStatus::Failed;
                return Err(format!(
                    "Workflow exceeded iteration limit of {}",
                    self.config.max_iterations
                ));
            }

            info!("📍 Step {}: executing node '{}'", iteration, current_node);
            let node = self
                .graph
                .get_node(&current_node)
                .ok_or_else(|| format!("Node '{}' not found", current_node))?;
            state.set_current_node(&current_node);

            let update = match timeout(node_timeout, node.function.execute(&state)).await {
                Ok(Ok(update)) => update,
                Ok(Err(e)) => {
                    error!("❌ Node '{}' failed: {}", current_node, e);
                    state.status = WorkflowStatus::Failed;
                    return Err(e);
                }
                Err(_) => {
                    state.status = WorkflowStatus::Failed;
                    return Err(format!(
                        "Node '{}' timed out after {}s",
                        current_node, self.config.node_timeout_seconds
                    ));
                }
            };

            state.apply_update(update);
            observer(&state, &current_node);

            if state.is_terminal() {
                break;
            }

            match self.graph.get_next_node(&current_node, &state) {
                Some(next) => current_node = next,
                None => {
                    state.status = WorkflowStatus::Completed;
                    break;
                }
            }
        }

        info!(
            "🏁 Workflow run finished: {} ({} steps)",
            state.workflow_id, iteration
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::graph::{NodeFunction, NodeType, StateGraphBuilder};
    use crate::workflow::router::research_loop_router;
    use crate::workflow::state::{Platform, StateUpdate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn test_state(topic: &str) -> WorkflowState {
        WorkflowState::new(
            topic.to_string(),
            "educational".to_string(),
            "".to_string(),
            None,
            Platform::Youtube,
        )
    }

    /// Research stub that records how often it ran and tags results with the
    /// state's topic.
    struct StubResearch {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl NodeFunction for StubResearch {
        async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StateUpdate::new()
                .with_research_results(format!("research on {}", state.topic))
                .with_needs_more_research(false)
                .with_research_attempts(state.research_attempts + 1))
        }
    }

    /// Screenwrite stub that requests one loop-back, then produces a script.
    struct StubScreenwrite {
        loop_once: bool,
    }

    #[async_trait]
    impl NodeFunction for StubScreenwrite {
        async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate, String> {
            if self.loop_once && state.research_attempts < 2 {
                Ok(StateUpdate::new()
                    .with_final_script(String::new())
                    .with_needs_more_research(true))
            } else {
                Ok(StateUpdate::new()
                    .with_final_script(format!("Script: {}", state.research_results))
                    .with_needs_more_research(false))
            }
        }
    }

    struct StubComplete;

    #[async_trait]
    impl NodeFunction for StubComplete {
        async fn execute(&self, _state: &WorkflowState) -> Result<StateUpdate, String> {
            Ok(StateUpdate::new().with_status(WorkflowStatus::Completed))
        }
    }

    struct FailingNode;

    #[async_trait]
    impl NodeFunction for FailingNode {
        async fn execute(&self, _state: &WorkflowState) -> Result<StateUpdate, String> {
            Err("network timeout contacting model provider".to_string())
        }
    }

    fn build_pipeline(loop_once: bool, calls: Arc<AtomicU32>) -> WorkflowExecutor {
        let graph = StateGraphBuilder::new()
            .add_node("research", NodeType::Agent, Arc::new(StubResearch { calls }), "research")
            .add_node(
                "screenwrite",
                NodeType::Agent,
                Arc::new(StubScreenwrite { loop_once }),
                "screenwrite",
            )
            .add_node("complete", NodeType::End, Arc::new(StubComplete), "complete")
            .set_entry_point("research")
            .add_edge("research", "screenwrite")
            .add_conditional_edge("screenwrite", research_loop_router(3))
            .build()
            .unwrap();
        WorkflowExecutor::new(graph, ExecutorConfig::default())
    }

    #[tokio::test]
    async fn test_straight_run_completes_without_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = build_pipeline(false, calls.clone());

        let result = executor.run(test_state("History of Rome")).await.unwrap();
        assert_eq!(result.status, WorkflowStatus::Completed);
        assert_eq!(result.final_script, "Script: research on History of Rome");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!result.needs_more_research);
    }

    #[tokio::test]
    async fn test_sentinel_triggers_exactly_one_research_rerun() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = build_pipeline(true, calls.clone());

        let result = executor.run(test_state("History of Rome")).await.unwrap();
        assert_eq!(result.status, WorkflowStatus::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.research_attempts, 2);
        assert_eq!(result.final_script, "Script: research on History of Rome");
    }

    #[tokio::test]
    async fn test_node_error_propagates_without_final_script() {
        let graph = StateGraphBuilder::new()
            .add_node("research", NodeType::Agent, Arc::new(FailingNode), "research")
            .set_entry_point("research")
            .build()
            .unwrap();
        let executor = WorkflowExecutor::new(graph, ExecutorConfig::default());

        let err = executor.run(test_state("Topic")).await.unwrap_err();
        assert!(err.contains("network timeout"));
    }

    #[tokio::test]
    async fn test_iteration_limit_stops_runaway_loop() {
        struct AlwaysLoop;

        #[async_trait]
        impl NodeFunction for AlwaysLoop {
            async fn execute(&self, _state: &WorkflowState) -> Result<StateUpdate, String> {
                Ok(StateUpdate::new())
            }
        }

        let graph = StateGraphBuilder::new()
            .add_node("a", NodeType::Agent, Arc::new(AlwaysLoop), "a")
            .add_node("b", NodeType::Agent, Arc::new(AlwaysLoop), "b")
            .set_entry_point("a")
            .add_edge("a", "b")
            .add_edge("b", "a")
            .build()
            .unwrap();
        let executor = WorkflowExecutor::new(
            graph,
            ExecutorConfig {
                max_iterations: 5,
                node_timeout_seconds: 10,
            },
        );

        let err = executor.run(test_state("Topic")).await.unwrap_err();
        assert!(err.contains("iteration limit"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_share_state() {
        let calls_a = Arc::new(AtomicU32::new(0));
        let calls_b = Arc::new(AtomicU32::new(0));
        let executor_a = build_pipeline(false, calls_a);
        let executor_b = build_pipeline(false, calls_b);

        let (a, b) = tokio::join!(
            executor_a.run(test_state("History of Rome")),
            executor_b.run(test_state("Deep Sea Creatures")),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.research_results, "research on History of Rome");
        assert_eq!(b.research_results, "research on Deep Sea Creatures");
        assert!(!a.final_script.contains("Deep Sea"));
        assert!(!b.final_script.contains("Rome"));
        assert_ne!(a.workflow_id, b.workflow_id);
    }

    #[tokio::test]
    async fn test_observer_sees_each_completed_node() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = build_pipeline(false, calls);

        let mut visited = Vec::new();
        executor
            .run_with_observer(test_state("Topic"), |_state, node| {
                visited.push(node.to_string());
            })
            .await
            .unwrap();
        assert_eq!(visited, vec!["research", "screenwrite", "complete"]);
    }
}
