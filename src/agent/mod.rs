// src/agent/mod.rs
//! LLM agent layer: one invoker per stage, a role→tool capability table, and
//! the executor that turns tool calls into text results.

use crate::config::PromptConfig;
use crate::openai_client::OpenAiClient;
use std::sync::Arc;
use thiserror::Error;

pub mod script_agent;
pub mod tool_executor;
pub mod tool_registry;

pub use script_agent::ScriptAgent;
pub use tool_executor::ToolExecutor;
pub use tool_registry::ToolRegistry;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("chat completion failed: {0}")]
    Api(String),
}

/// Shared read-only wiring for every workflow run: the model client, the tool
/// table, the tool executor, and the prompt templates. Built once at startup.
pub struct AgentRuntime {
    pub openai: Arc<OpenAiClient>,
    pub registry: ToolRegistry,
    pub tools: Arc<ToolExecutor>,
    pub prompts: Arc<PromptConfig>,
}
