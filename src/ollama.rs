use crate::io_struct::{ChatRequest, ChatResponse};
use anyhow::{Context, bail};
use std::time::Duration;

/// Thin client for the Ollama-compatible chat API. Holds no mutable state;
/// one instance is shared across all request tasks.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OllamaClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues a single `POST <base>/api/chat`. Any transport failure,
    /// non-200 status, or undecodable body surfaces as one opaque error.
    pub async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            bail!("backend returned {}: {}", status, body.trim());
        }
        response
            .json::<ChatResponse>()
            .await
            .context("failed to decode backend chat response")
    }
}
