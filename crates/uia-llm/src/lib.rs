//! LLM Client (C1): text→JSON-mode completion with timeout & error mapping.
//!
//! Every downstream stage (C6 through C10) calls `LlmClient::complete_json`
//! and is expected to apply the defensive parse of `parse_json_response`
//! (§9) before trusting the payload.

mod client;
pub mod openai;
pub mod parse;

pub use client::{ChatMessage, ClientError, CompletionOptions, LlmClient, MockLlmClient, Role};
pub use openai::OpenAiClient;
pub use parse::{parse_json_response, parse_json_value};
