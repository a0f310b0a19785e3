// src/notion_client.rs
//! Export capability: saves a finished script as a page in a Notion database.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Notion caps page-create payloads at 100 child blocks.
const MAX_BLOCKS_PER_REQUEST: usize = 100;

#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    token: String,
    database_id: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: String, database_id: String) -> Self {
        Self {
            client: Client::new(),
            token,
            database_id,
            base_url: "https://api.notion.com/v1".to_string(),
        }
    }

    /// Create a database page titled `title` carrying `content` as paragraph
    /// blocks, batching past the per-request block cap.
    pub async fn create_page(&self, title: &str, content: &str) -> Result<String, String> {
        let blocks = paragraph_blocks(content);
        let total = blocks.len();
        let first_chunk: Vec<Value> = blocks
            .iter()
            .take(MAX_BLOCKS_PER_REQUEST)
            .cloned()
            .collect();

        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                "Name": { "title": [{ "text": { "content": title } }] },
                "Type": { "multi_select": [{ "name": "Video" }] },
            },
            "children": first_chunk,
        });

        let page: Value = self
            .post("pages", &body)
            .await
            .map_err(|e| format!("Notion page create failed: {}", e))?;

        let page_id = page["id"]
            .as_str()
            .ok_or_else(|| "Notion response missing page id".to_string())?
            .to_string();

        for batch in blocks[total.min(MAX_BLOCKS_PER_REQUEST)..].chunks(MAX_BLOCKS_PER_REQUEST) {
            let append = json!({ "children": batch });
            self.patch(&format!("blocks/{}/children", page_id), &append)
                .await
                .map_err(|e| format!("Notion block append failed: {}", e))?;
        }

        Ok(format!("Created page '{}' with {} blocks", title, total))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, String> {
        self.send(self.client.post(format!("{}/{}", self.base_url, path)), body)
            .await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, String> {
        self.send(self.client.patch(format!("{}/{}", self.base_url, path)), body)
            .await
    }

    async fn send(&self, request: reqwest::RequestBuilder, body: &Value) -> Result<Value, String> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", "2022-06-28")
            .header("content-type", "application/json")
            .timeout(Duration::from_secs(30))
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {}", e))?;

        if !status.is_success() {
            return Err(format!("API error ({}): {}", status, text));
        }

        serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {}", e))
    }
}

/// Split markdown-ish text into one paragraph block per non-empty line.
fn paragraph_blocks(content: &str) -> Vec<Value> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{ "type": "text", "text": { "content": line } }]
                }
            })
        })
        .collect()
}
