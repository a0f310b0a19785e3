// Workflow orchestration: a small stage graph with shared state and one
// conditional loop edge
pub mod executor;
pub mod graph;
pub mod research;
pub mod router;
pub mod screenwrite;
pub mod script_workflow;
pub mod state;

pub use script_workflow::{
    run_script_workflow, run_script_workflow_with_state, ScriptRequest, MAX_RESEARCH_PASSES,
};
pub use state::{Platform, WorkflowState, WorkflowStatus};
