//! MEDCOST — LLM-backed medical procedure cost estimates
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves secrets, wires the LLM client into the estimator, and serves
//! HTTP until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use medcost::config::{self, AppConfig};
use medcost::engine::estimator::Estimator;
use medcost::llm::openai::OpenAiClient;
use medcost::llm::LlmClient;
use medcost::server::{self, routes::ServerState};

const BANNER: &str = r#"
 __  __ _____ ____   ____ ___  ____ _____
|  \/  | ____|  _ \ / ___/ _ \/ ___|_   _|
| |\/| |  _| | | | | |  | | | \___ \ | |
| |  | | |___| |_| | |__| |_| |___) || |
|_|  |_|_____|____/ \____\___/|____/ |_|

  Procedure cost estimates, v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("MEDCOST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    // Missing API key is fatal here, before anything binds.
    let secrets = cfg.resolve_secrets()?;
    if secrets.session_secret_is_default {
        warn!(
            env = %cfg.session.secret_env,
            "Session secret not set"
        );
    }

    println!("{BANNER}");

    let llm = build_llm(&cfg, secrets)?;
    info!(
        model = llm.model_name(),
        cache_capacity = cfg.cache.capacity,
        eviction = ?cfg.cache.eviction,
        cache_failures = cfg.cache.cache_failures,
        "MEDCOST starting up"
    );

    let estimator = Estimator::new(llm, &cfg.cache);
    let state = Arc::new(ServerState::new(estimator));

    server::serve(state, &cfg.server).await
}

/// Build the configured LLM provider.
fn build_llm(cfg: &AppConfig, secrets: config::Secrets) -> Result<Arc<dyn LlmClient>> {
    match cfg.llm.provider.as_str() {
        "openai" => {
            info!(model = %cfg.llm.model, url = %cfg.llm.api_url, "Using OpenAI LLM provider");
        }
        other => {
            warn!(
                provider = other,
                "Unknown LLM provider, treating it as OpenAI-compatible"
            );
        }
    }
    let client = OpenAiClient::from_config(secrets.llm_api_key, &cfg.llm)?;
    Ok(Arc::new(client))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("medcost=info"));

    let json_logging = std::env::var("MEDCOST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
