//! JSON-mode `LlmClient` backed by an OpenAI-compatible chat completions API.
//!
//! Grounded on `skynet-agent::openai::OpenAiProvider`: same request shape,
//! same 429/`retry-after` handling, same bearer-auth client. Narrowed to the
//! single operation C1 needs — no streaming, no tool calls — and requests
//! `response_format: {"type": "json_object"}` per §4.1/§6.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::{ChatMessage, ClientError, CompletionOptions, LlmClient, Role};

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
}

impl OpenAiClient {
    /// Create a standard OpenAI client. `base_url` defaults to the public API
    /// and should not carry a trailing slash when overridden.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com".to_string()),
            provider_name: "openai".to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete_json(
        &self,
        prompt: &str,
        opts: &CompletionOptions,
    ) -> Result<String, ClientError> {
        let mut messages = Vec::new();
        if let Some(system) = &opts.system {
            messages.push(ChatMessage {
                role: Role::System,
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        });

        let body = serde_json::json!({
            "model": opts.model,
            "messages": messages,
            "temperature": opts.temperature,
            "max_tokens": opts.max_tokens,
            "response_format": {"type": "json_object"},
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %opts.model, "sending json-mode completion request");

        let send = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send();

        let resp = match tokio::time::timeout(opts.timeout, send).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(ClientError::Transient(format!("request failed: {e}"))),
            Err(_) => return Err(ClientError::Transient("request timed out".to_string())),
        };

        let status = resp.status().as_u16();
        if status == 429 {
            return Err(ClientError::Transient("rate limited".to_string()));
        }
        if status >= 500 {
            return Err(ClientError::Transient(format!("server error: {status}")));
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "openai API error");
            return Err(ClientError::Fatal(format!("api error {status}: {text}")));
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Fatal(format!("malformed API response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Fatal("no completion choice returned".to_string()))
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("provider_name", &self.provider_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

/// Builds a `CompletionOptions` from config defaults plus a per-call model override,
/// matching each stage's usage (planner/rerank/general model per `LlmConfig`).
pub fn options_for(model: &str, temperature: f32, max_tokens: u32, timeout_secs: u64) -> CompletionOptions {
    CompletionOptions {
        model: model.to_string(),
        temperature,
        max_tokens,
        system: None,
        timeout: Duration::from_secs(timeout_secs),
    }
}
