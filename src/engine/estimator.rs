//! Estimation pipeline: prompt → LLM → normalize, memoized per request.
//!
//! The cache lock is released while the LLM call is in flight, so two
//! concurrent misses on the same key may both reach the provider. That
//! duplicate work is accepted; the cache is an optimization only.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::cache::{policy_for, EvictionPolicy, MemoCache};
use super::normalizer::parse_estimate;
use super::prompt::build_prompt;
use crate::config::CacheConfig;
use crate::llm::{LlmClient, LlmError};
use crate::types::{EstimateError, EstimateOutcome, EstimateRequest};

/// Point-in-time counters for the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EstimatorStats {
    pub cache_entries: usize,
    pub cache_capacity: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_evictions: u64,
    pub llm_calls: u64,
    pub failures: u64,
}

pub struct Estimator {
    llm: Arc<dyn LlmClient>,
    cache: Mutex<MemoCache<EstimateRequest, EstimateOutcome>>,
    cache_failures: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    llm_calls: AtomicU64,
    failures: AtomicU64,
}

impl Estimator {
    /// Build an estimator with the cache described by `cfg`.
    pub fn new(llm: Arc<dyn LlmClient>, cfg: &CacheConfig) -> Self {
        Self::with_policy(llm, cfg.capacity, policy_for(cfg.eviction), cfg.cache_failures)
    }

    /// Build an estimator with an explicit eviction policy.
    pub fn with_policy(
        llm: Arc<dyn LlmClient>,
        capacity: usize,
        policy: Box<dyn EvictionPolicy<EstimateRequest>>,
        cache_failures: bool,
    ) -> Self {
        Self {
            llm,
            cache: Mutex::new(MemoCache::new(capacity, policy)),
            cache_failures,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            llm_calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Produce an estimate for `request`, serving from cache when possible.
    pub async fn estimate(&self, request: &EstimateRequest) -> EstimateOutcome {
        if let Some(cached) = self.cache.lock().await.get(request) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(request = %request, "Estimate served from cache");
            return cached;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        // A panic in the provider client is a pipeline failure like any other.
        let outcome = AssertUnwindSafe(self.run_pipeline(request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(EstimateError::Unexpected(panic_message(panic.as_ref()).to_string()))
            });

        match &outcome {
            Ok(result) => info!(request = %request, estimate = %result, "Estimate complete"),
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!(request = %request, kind = e.kind(), error = %e, "Estimate failed");
            }
        }

        if outcome.is_ok() || self.cache_failures {
            self.cache.lock().await.insert(request.clone(), outcome.clone());
        }

        outcome
    }

    async fn run_pipeline(&self, request: &EstimateRequest) -> EstimateOutcome {
        let prompt = build_prompt(
            &request.procedure,
            &request.zip_code,
            &request.procedure_code,
        );

        self.llm_calls.fetch_add(1, Ordering::Relaxed);
        let raw = self
            .llm
            .complete_json(&prompt)
            .await
            .map_err(classify_llm_error)?;

        parse_estimate(&raw)
    }

    pub async fn stats(&self) -> EstimatorStats {
        let cache = self.cache.lock().await;
        EstimatorStats {
            cache_entries: cache.len(),
            cache_capacity: cache.capacity(),
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
            cache_evictions: cache.evictions(),
            llm_calls: self.llm_calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
}

/// Map a provider failure onto the caller-facing taxonomy.
fn classify_llm_error(err: LlmError) -> EstimateError {
    match err {
        LlmError::RateLimited(msg) => EstimateError::RateLimit(msg),
        LlmError::Api { status, message } => EstimateError::Api(format!("HTTP {status}: {message}")),
        LlmError::Transport(msg) => EstimateError::Api(msg),
        LlmError::EmptyResponse => EstimateError::Unexpected(LlmError::EmptyResponse.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
