//! LLM integration for cost estimation.
//!
//! Defines the `LlmClient` trait and the OpenAI-compatible implementation.
//! The trait only moves prompt text out and raw response text back; parsing
//! and sanitization live in `engine::normalizer`.

pub mod openai;

use async_trait::async_trait;

/// Transport-level failures talking to the LLM provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

/// Abstraction over chat-completion providers.
///
/// Implementors send a single user-role prompt and ask for a JSON object
/// back. The returned text is untrusted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `prompt` and return the raw text content of the first choice.
    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
