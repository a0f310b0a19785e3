// src/tavily_client.rs
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Result count requested per search. Kept small so snippets fit comfortably
/// in the agent's context.
const MAX_RESULTS: usize = 2;

#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TavilySearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<TavilySearchResult>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TavilySearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.tavily.com".to_string(),
        }
    }

    /// Run a web search and format the hits as agent-readable text.
    pub async fn search(&self, query: &str) -> Result<String, String> {
        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": MAX_RESULTS,
            "include_answer": true,
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("content-type", "application/json")
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Tavily request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("Tavily API error ({}): {}", status, detail));
        }

        let parsed: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Tavily response: {}", e))?;

        Ok(format_results(&parsed, query))
    }
}

fn format_results(response: &TavilySearchResponse, query: &str) -> String {
    if response.results.is_empty() && response.answer.is_none() {
        return format!("No search results found for '{}'", query);
    }

    let mut out = String::new();
    if let Some(answer) = &response.answer {
        if !answer.is_empty() {
            out.push_str(&format!("Summary: {}\n\n", answer));
        }
    }
    for (i, result) in response.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})\n{}\n\n",
            i + 1,
            result.title,
            result.url,
            result.content
        ));
    }
    out.trim_end().to_string()
}
