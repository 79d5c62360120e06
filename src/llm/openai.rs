//! OpenAI chat-completions integration.
//!
//! Implements the `LlmClient` trait against the OpenAI Chat Completions API
//! (or any compatible endpoint) in JSON-object response mode. No retries:
//! a failed call is reported to the caller immediately.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{LlmClient, LlmError};
use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    http: Client,
    api_key: SecretString,
    api_url: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(
        api_key: SecretString,
        model: Option<String>,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(
                timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            http,
            api_key,
            api_url: api_url.unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: None,
        })
    }

    /// Build a client from the `[llm]` config section.
    pub fn from_config(api_key: SecretString, cfg: &LlmConfig) -> Result<Self> {
        let mut client = Self::new(
            api_key,
            Some(cfg.model.clone()),
            Some(cfg.api_url.clone()),
            Some(cfg.timeout_secs),
        )?;
        client.max_tokens = cfg.max_tokens;
        Ok(client)
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            max_tokens: self.max_tokens,
        }
    }

    /// Pull the first choice's text out of a completion body.
    fn extract_content(body: ChatResponse) -> Result<String, LlmError> {
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(prompt);

        debug!(model = %self.model, prompt_len = prompt.len(), "OpenAI completion request");

        let response = self
            .http
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "OpenAI rate limit hit");
            return Err(LlmError::RateLimited(error_text));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "OpenAI API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("malformed completion body: {e}")))?;

        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        Self::extract_content(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
