// StateGraph - node and edge management for the stage pipeline
use super::state::{StateUpdate, WorkflowState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Node function type - async function that processes state
#[async_trait]
pub trait NodeFunction: Send + Sync {
    async fn execute(&self, state: &WorkflowState) -> Result<StateUpdate, String>;
}

/// Conditional routing function - decides the next node
pub type RouterFunction = Arc<dyn Fn(&WorkflowState) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeType {
    /// Agent node (LLM reasoning + tool calling)
    Agent,
    /// End node (terminal state)
    End,
}

#[derive(Clone)]
pub enum EdgeType {
    /// Fixed edge (always follows this path)
    Fixed(String),
    /// Conditional edge (router function decides)
    Conditional(RouterFunction),
}

impl std::fmt::Debug for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeType::Fixed(target) => write!(f, "Fixed({})", target),
            EdgeType::Conditional(_) => write!(f, "Conditional(<router>)"),
        }
    }
}

pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub function: Arc<dyn NodeFunction>,
    pub description: String,
}

/// StateGraph - the workflow graph
pub struct StateGraph {
    nodes: HashMap<String, Node>,
    edges: HashMap<String, EdgeType>,
    entry_point: Option<String>,
    compiled: bool,
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry_point: None,
            compiled: false,
        }
    }

    pub fn add_node(
        &mut self,
        id: String,
        node_type: NodeType,
        function: Arc<dyn NodeFunction>,
        description: String,
    ) -> &mut Self {
        if self.compiled {
            panic!("Cannot modify compiled graph");
        }

        let node = Node {
            id: id.clone(),
            node_type,
            function,
            description,
        };
        self.nodes.insert(id, node);
        self
    }

    pub fn add_edge(&mut self, from: String, to: String) -> &mut Self {
        if self.compiled {
            panic!("Cannot modify compiled graph");
        }
        self.edges.insert(from, EdgeType::Fixed(to));
        self
    }

    pub fn add_conditional_edge(&mut self, from: String, router: RouterFunction) -> &mut Self {
        if self.compiled {
            panic!("Cannot modify compiled graph");
        }
        self.edges.insert(from, EdgeType::Conditional(router));
        self
    }

    pub fn set_entry_point(&mut self, node_id: String) -> &mut Self {
        if self.compiled {
            panic!("Cannot modify compiled graph");
        }
        self.entry_point = Some(node_id);
        self
    }

    /// Validate the graph and freeze it.
    pub fn compile(&mut self) -> Result<(), String> {
        let entry = self
            .entry_point
            .as_ref()
            .ok_or_else(|| "No entry point set".to_string())?;
        if !self.nodes.contains_key(entry) {
            return Err(format!("Entry point node '{}' does not exist", entry));
        }

        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(format!("Edge from non-existent node: {}", from));
            }
            if let EdgeType::Fixed(to) = edge {
                if !self.nodes.contains_key(to) {
                    return Err(format!("Edge to non-existent node: {}", to));
                }
            }
            // Conditional targets are validated at runtime
        }

        self.compiled = true;
        tracing::debug!(
            "StateGraph compiled: {} nodes, {} edges",
            self.nodes.len(),
            self.edges.len()
        );
        Ok(())
    }

    /// Next node id after `current_node`, given the state. None means the
    /// graph has reached an end.
    pub fn get_next_node(&self, current_node: &str, state: &WorkflowState) -> Option<String> {
        match self.edges.get(current_node) {
            Some(EdgeType::Fixed(target)) => Some(target.clone()),
            Some(EdgeType::Conditional(router)) => router(state),
            None => None,
        }
    }

    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn get_entry_point(&self) -> Option<&String> {
        self.entry_point.as_ref()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for StateGraph
pub struct StateGraphBuilder {
    graph: StateGraph,
}

impl StateGraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: StateGraph::new(),
        }
    }

    pub fn add_node(
        mut self,
        id: &str,
        node_type: NodeType,
        function: Arc<dyn NodeFunction>,
        description: &str,
    ) -> Self {
        self.graph
            .add_node(id.to_string(), node_type, function, description.to_string());
        self
    }

    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.graph.add_edge(from.to_string(), to.to_string());
        self
    }

    pub fn add_conditional_edge(mut self, from: &str, router: RouterFunction) -> Self {
        self.graph.add_conditional_edge(from.to_string(), router);
        self
    }

    pub fn set_entry_point(mut self, node_id: &str) -> Self {
        self.graph.set_entry_point(node_id.to_string());
        self
    }

    pub fn build(mut self) -> Result<StateGraph, String> {
        self.graph.compile()?;
        Ok(self.graph)
    }
}

impl Default for StateGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::Platform;

    struct NoopNode;

    #[async_trait]
    impl NodeFunction for NoopNode {
        async fn execute(&self, _state: &WorkflowState) -> Result<StateUpdate, String> {
            Ok(StateUpdate::new())
        }
    }

    fn test_state() -> WorkflowState {
        WorkflowState::new(
            "Topic".to_string(),
            "casual".to_string(),
            "".to_string(),
            None,
            Platform::Youtube,
        )
    }

    #[test]
    fn test_compile_requires_entry_point() {
        let result = StateGraphBuilder::new()
            .add_node("a", NodeType::Agent, Arc::new(NoopNode), "node a")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_rejects_dangling_edge() {
        let result = StateGraphBuilder::new()
            .add_node("a", NodeType::Agent, Arc::new(NoopNode), "node a")
            .set_entry_point("a")
            .add_edge("a", "missing")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_routing_follows_fixed_and_conditional_edges() {
        let graph = StateGraphBuilder::new()
            .add_node("a", NodeType::Agent, Arc::new(NoopNode), "node a")
            .add_node("b", NodeType::Agent, Arc::new(NoopNode), "node b")
            .add_node("end", NodeType::End, Arc::new(NoopNode), "end")
            .set_entry_point("a")
            .add_edge("a", "b")
            .add_conditional_edge(
                "b",
                Arc::new(|state: &WorkflowState| {
                    if state.needs_more_research {
                        Some("a".to_string())
                    } else {
                        Some("end".to_string())
                    }
                }),
            )
            .build()
            .unwrap();

        let mut state = test_state();
        assert_eq!(graph.get_next_node("a", &state), Some("b".to_string()));
        assert_eq!(graph.get_next_node("b", &state), Some("end".to_string()));

        state.needs_more_research = true;
        assert_eq!(graph.get_next_node("b", &state), Some("a".to_string()));
        assert_eq!(graph.get_next_node("end", &state), None);
    }
}
