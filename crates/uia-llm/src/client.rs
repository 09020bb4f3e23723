use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Per-call completion parameters (§6 LLM provider contract).
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system: Option<String>,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            system: None,
            timeout: Duration::from_secs(uia_core::config::DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transient: {0}")]
    Transient(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn to_uia_error(&self) -> uia_core::UiaError {
        match self {
            ClientError::Transient(msg) => uia_core::UiaError::Transient(msg.clone()),
            ClientError::Fatal(msg) => uia_core::UiaError::Fatal(msg.clone()),
            ClientError::Cancelled => uia_core::UiaError::Transient("cancelled".to_string()),
        }
    }
}

/// Common interface for JSON-mode LLM completion (C1, §4.1, §6).
///
/// Requests a JSON-object response mode; fails with `Transient` on
/// timeout/rate-limit and `Fatal` on malformed API responses. No retries at
/// this layer — callers decide.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the raw string the model emitted (expected to be a JSON object,
    /// or something `parse_json_response` can repair).
    async fn complete_json(
        &self,
        prompt: &str,
        opts: &CompletionOptions,
    ) -> Result<String, ClientError>;
}

/// Deterministic test double. Responses are matched by the first prompt
/// substring that appears as a key; falls back to `default_response` if set.
pub struct MockLlmClient {
    pub responses: HashMap<String, String>,
    pub default_response: Option<String>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            default_response: None,
        }
    }

    pub fn with_response(mut self, prompt_substring: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.insert(prompt_substring.into(), response.into());
        self
    }

    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete_json(
        &self,
        prompt: &str,
        _opts: &CompletionOptions,
    ) -> Result<String, ClientError> {
        debug!(prompt_len = prompt.len(), "mock llm completion");
        for (key, resp) in &self.responses {
            if prompt.contains(key.as_str()) {
                return Ok(resp.clone());
            }
        }
        if let Some(default) = &self.default_response {
            return Ok(default.clone());
        }
        warn!("mock llm client has no matching response configured");
        Err(ClientError::Fatal(
            "no mock response configured for prompt".to_string(),
        ))
    }
}
