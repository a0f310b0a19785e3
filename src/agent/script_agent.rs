// src/agent/script_agent.rs
//! One agent invocation: a system prompt, a user instruction, and an
//! iterative tool-calling loop against the chat-completions API.

use crate::agent::{AgentError, ToolExecutor};
use crate::openai_client::{ChatMessage, OpenAiClient, ToolDefinition};
use std::sync::Arc;

/// Safety cap on tool-calling rounds within a single invocation.
const MAX_ITERATIONS: usize = 8;

pub struct ScriptAgent {
    client: Arc<OpenAiClient>,
    tools: Vec<ToolDefinition>,
    executor: Arc<ToolExecutor>,
    name: &'static str,
}

impl ScriptAgent {
    pub fn new(
        client: Arc<OpenAiClient>,
        tools: Vec<ToolDefinition>,
        executor: Arc<ToolExecutor>,
        name: &'static str,
    ) -> Self {
        Self {
            client,
            tools,
            executor,
            name,
        }
    }

    /// Run the agent to completion and return its final textual message.
    ///
    /// An empty string means the model finished without producing text; the
    /// calling stage substitutes its own sentinel for that case. Transport
    /// failures are raised, not swallowed.
    pub async fn run(&self, system_prompt: &str, user_message: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_message),
        ];
        let mut final_text = String::new();
        let mut iterations = 0;
        let mut finished = false;

        while iterations < MAX_ITERATIONS {
            iterations += 1;

            let tools = if self.tools.is_empty() {
                None
            } else {
                Some(self.tools.clone())
            };

            let reply = self
                .client
                .generate_content(messages.clone(), tools)
                .await
                .map_err(AgentError::Api)?;

            if let Some(text) = reply.content.as_deref() {
                if !text.is_empty() {
                    final_text = text.to_string();
                }
            }

            let tool_calls = reply.tool_calls.clone().unwrap_or_default();
            messages.push(reply);

            if tool_calls.is_empty() {
                finished = true;
                break;
            }

            for call in tool_calls {
                let result = match serde_json::from_str(&call.function.arguments) {
                    Ok(args) => self.executor.execute(&call.function.name, &args).await,
                    Err(e) => format!("Error: could not parse tool arguments: {}", e),
                };
                messages.push(ChatMessage::tool_result(call.id, result));
            }
        }

        if !finished {
            tracing::warn!(
                "⚠️ {} agent hit the {}-iteration tool cap, returning last text",
                self.name,
                MAX_ITERATIONS
            );
        }

        tracing::debug!("{} agent finished after {} round(s)", self.name, iterations);
        Ok(final_text)
    }
}
