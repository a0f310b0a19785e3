// Router - the research-loop routing decision
use super::graph::RouterFunction;
use super::state::WorkflowState;
use std::sync::Arc;

/// Route back into research when the screenwriting stage asked for another
/// pass and the pass budget is not exhausted; otherwise finish.
///
/// `max_passes` counts total research passes, so a state that has already
/// researched `max_passes` times goes to "complete" regardless of the flag.
pub fn research_loop_router(max_passes: u32) -> RouterFunction {
    Arc::new(move |state: &WorkflowState| {
        if state.needs_more_research && state.research_attempts < max_passes {
            tracing::info!(
                "🔁 Screenwriter requested more research (pass {} of {})",
                state.research_attempts + 1,
                max_passes
            );
            Some("research".to_string())
        } else {
            Some("complete".to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::Platform;

    fn state_with(needs_more_research: bool, research_attempts: u32) -> WorkflowState {
        let mut state = WorkflowState::new(
            "Topic".to_string(),
            "casual".to_string(),
            "".to_string(),
            None,
            Platform::Youtube,
        );
        state.needs_more_research = needs_more_research;
        state.research_attempts = research_attempts;
        state
    }

    #[test]
    fn test_loops_back_while_budget_remains() {
        let router = research_loop_router(3);
        assert_eq!(router(&state_with(true, 1)), Some("research".to_string()));
        assert_eq!(router(&state_with(true, 2)), Some("research".to_string()));
    }

    #[test]
    fn test_completes_when_flag_clear() {
        let router = research_loop_router(3);
        assert_eq!(router(&state_with(false, 1)), Some("complete".to_string()));
    }

    #[test]
    fn test_completes_when_budget_exhausted() {
        let router = research_loop_router(3);
        assert_eq!(router(&state_with(true, 3)), Some("complete".to_string()));
    }
}
