//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section is defaulted, so a partial (or missing) file still yields
//! a runnable configuration. Secrets (API key, session secret) are referenced
//! by env-var name in the config and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    /// Chat-completions endpoint. Any OpenAI-compatible server works.
    pub api_url: String,
    pub timeout_secs: u64,
    /// Optional completion cap; omitted from the request when unset.
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: 120,
            max_tokens: None,
        }
    }
}

/// Which entry the memo cache drops when it is full.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvictionKind {
    /// Oldest inserted key goes first; lookups do not refresh entries.
    #[default]
    Insertion,
    /// Least recently looked-up key goes first.
    Lru,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of distinct request keys held. `0` disables caching.
    pub capacity: usize,
    pub eviction: EvictionKind,
    /// Whether failed estimates are memoized alongside successful ones.
    pub cache_failures: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            eviction: EvictionKind::Insertion,
            cache_failures: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub secret_env: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_env: "SESSION_SECRET".to_string(),
        }
    }
}

/// Secret values resolved from the environment at startup.
pub struct Secrets {
    pub llm_api_key: SecretString,
    /// True when no session secret is set in the environment.
    pub session_secret_is_default: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve an environment variable name to its value.
    /// Empty values count as unset.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .ok()
            .filter(|v| !v.is_empty())
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve all secrets. A missing LLM API key is fatal; a missing
    /// session secret is only flagged.
    pub fn resolve_secrets(&self) -> Result<Secrets> {
        let llm_api_key = Self::resolve_env(&self.llm.api_key_env)
            .context("LLM API key is required")?;

        // Nothing signs sessions, so only whether a real value is set matters.
        let session_secret_is_default = Self::resolve_env(&self.session.secret_env).is_err();

        Ok(Secrets {
            llm_api_key: SecretString::new(llm_api_key),
            session_secret_is_default,
        })
    }
}
