// src/agent/tool_executor.rs
//! Executes tool calls requested by an agent. Failures are returned as
//! "Error: ..." strings rather than raised, so the agent can read them and
//! adjust course in-band.

use crate::notion_client::NotionClient;
use crate::tavily_client::TavilyClient;
use crate::agent::tool_registry::{NOTION_CREATE_PAGE, READ_REFERENCE_DOC, WEB_SEARCH};
use serde_json::Value;
use std::path::Path;

/// File extensions the reference reader accepts.
const READABLE_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "text"];

pub struct ToolExecutor {
    tavily: Option<TavilyClient>,
    notion: Option<NotionClient>,
}

impl ToolExecutor {
    pub fn new(tavily: Option<TavilyClient>, notion: Option<NotionClient>) -> Self {
        Self { tavily, notion }
    }

    pub async fn execute(&self, name: &str, args: &Value) -> String {
        tracing::info!("🔧 Executing tool: {}", name);
        match name {
            WEB_SEARCH => self.web_search(args).await,
            READ_REFERENCE_DOC => read_reference_doc(args).await,
            NOTION_CREATE_PAGE => self.notion_create_page(args).await,
            other => format!("Error: unknown tool '{}'", other),
        }
    }

    async fn web_search(&self, args: &Value) -> String {
        let query = match args["query"].as_str() {
            Some(q) if !q.trim().is_empty() => q,
            _ => return "Error: web_search requires a non-empty 'query' argument".to_string(),
        };

        match &self.tavily {
            Some(client) => match client.search(query).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("Web search failed for '{}': {}", query, e);
                    format!("Error: web search failed: {}", e)
                }
            },
            None => "Error: web search is not configured (TAVILY_API_KEY missing)".to_string(),
        }
    }

    async fn notion_create_page(&self, args: &Value) -> String {
        let title = args["title"].as_str().unwrap_or("Untitled script");
        let content = match args["content"].as_str() {
            Some(c) if !c.is_empty() => c,
            _ => return "Error: notion_create_page requires a 'content' argument".to_string(),
        };

        match &self.notion {
            Some(client) => match client.create_page(title, content).await {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Notion export failed: {}", e);
                    format!("Error: {}", e)
                }
            },
            None => "Error: Notion export is not configured".to_string(),
        }
    }
}

async fn read_reference_doc(args: &Value) -> String {
    let file_path = match args["file_path"].as_str() {
        Some(p) if !p.trim().is_empty() => p,
        _ => return "Error: read_reference_doc requires a 'file_path' argument".to_string(),
    };

    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some(ext) if READABLE_EXTENSIONS.contains(&ext) => {}
        _ => {
            return format!(
                "Error: unsupported reference document type for '{}' (expected one of: {})",
                file_path,
                READABLE_EXTENSIONS.join(", ")
            )
        }
    }

    match tokio::fs::read_to_string(file_path).await {
        Ok(content) => content,
        Err(e) => format!("Error: could not read reference document '{}': {}", file_path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_tool_returns_inband_error() {
        let executor = ToolExecutor::new(None, None);
        let result = executor.execute("render_video", &json!({})).await;
        assert_eq!(result, "Error: unknown tool 'render_video'");
    }

    #[tokio::test]
    async fn test_web_search_without_client_is_inband_error() {
        let executor = ToolExecutor::new(None, None);
        let result = executor.execute(WEB_SEARCH, &json!({"query": "rome"})).await;
        assert!(result.starts_with("Error: web search is not configured"));
    }

    #[tokio::test]
    async fn test_read_reference_doc_missing_file() {
        let executor = ToolExecutor::new(None, None);
        let result = executor
            .execute(READ_REFERENCE_DOC, &json!({"file_path": "does/not/exist.md"}))
            .await;
        assert!(result.starts_with("Error: could not read reference document"));
    }

    #[tokio::test]
    async fn test_read_reference_doc_rejects_binary_types() {
        let executor = ToolExecutor::new(None, None);
        let result = executor
            .execute(READ_REFERENCE_DOC, &json!({"file_path": "clip.mp4"}))
            .await;
        assert!(result.starts_with("Error: unsupported reference document type"));
    }

    #[tokio::test]
    async fn test_missing_arguments_are_inband_errors() {
        let executor = ToolExecutor::new(None, None);
        let result = executor.execute(WEB_SEARCH, &json!({})).await;
        assert!(result.starts_with("Error: web_search requires"));
    }
}
