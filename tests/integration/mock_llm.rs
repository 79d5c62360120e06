//! Mock LLM for integration testing.
//!
//! Provides a deterministic `LlmClient` implementation that replies with a
//! canned body (or a forced error) and counts every call, all in-memory
//! with no network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use medcost::llm::{LlmClient, LlmError};

/// What the mock does on the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    RateLimited,
    ServerError,
    Empty,
}

/// A mock LLM provider for deterministic testing.
///
/// Clones share the same counters and reply, so a test can keep a handle
/// after moving the mock into the estimator.
#[derive(Clone)]
pub struct MockLlm {
    reply: Arc<Mutex<Reply>>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLlm {
    /// A mock that answers every prompt with `body`.
    pub fn replying(body: &str) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Reply::Body(body.to_string()))),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock returning a realistic, well-formed estimate.
    pub fn with_sample_estimate() -> Self {
        Self::replying(SAMPLE_ESTIMATE)
    }

    /// Change what subsequent calls return.
    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// Number of completed calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::RateLimited => Err(LlmError::RateLimited("mock: slow down".into())),
            Reply::ServerError => Err(LlmError::Api {
                status: 503,
                message: "mock: unavailable".into(),
            }),
            Reply::Empty => Err(LlmError::EmptyResponse),
        }
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

pub const SAMPLE_ESTIMATE: &str = r#"{
  "procedure_name": "Flu Shot",
  "procedure_code": "90686",
  "zip_code": "10001",
  "low_estimate": 20,
  "high_estimate": "75.50",
  "typical_insurance_cost": 0,
  "common_complications": [
    {"name": "Soreness at injection site", "estimated_cost": 0},
    {"name": "Allergic reaction", "estimated_cost": -150},
    {"name": "Fever"}
  ],
  "alternative_procedures": [
    {"name": "Nasal spray vaccine", "estimated_cost_range": [25, 60]},
    {"name": "High-dose vaccine", "estimated_cost_range": [50]}
  ],
  "recovery_info": {"estimated_time": "None", "associated_costs": null},
  "additional_info": "Often covered in full by insurance."
}"#;
