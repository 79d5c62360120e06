//! Shared types for the MEDCOST service.
//!
//! These types form the data model used across all modules: the inbound
//! request, the normalized estimate returned to callers, and the error
//! taxonomy for the estimation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for any string field the LLM did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated estimate request.
///
/// The triple is also the memoization key, so it is compared byte-for-byte:
/// no trimming or case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub procedure: String,
    pub zip_code: String,
    #[serde(default)]
    pub procedure_code: String,
}

impl EstimateRequest {
    pub fn new(
        procedure: impl Into<String>,
        zip_code: impl Into<String>,
        procedure_code: impl Into<String>,
    ) -> Self {
        Self {
            procedure: procedure.into(),
            zip_code: zip_code.into(),
            procedure_code: procedure_code.into(),
        }
    }
}

impl fmt::Display for EstimateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.procedure, self.zip_code)?;
        if !self.procedure_code.is_empty() {
            write!(f, " [{}]", self.procedure_code)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Normalized cost estimate. Every cost is either `None` or `>= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub procedure_name: String,
    pub procedure_code: String,
    pub zip_code: String,
    pub low_estimate: Option<f64>,
    pub high_estimate: Option<f64>,
    pub typical_insurance_cost: Option<f64>,
    pub common_complications: Vec<Complication>,
    pub alternative_procedures: Vec<AlternativeProcedure>,
    pub recovery_info: RecoveryInfo,
    pub additional_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complication {
    pub name: String,
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeProcedure {
    pub name: String,
    /// `[low, high]`; each bound is independently nullable.
    pub estimated_cost_range: [Option<f64>; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryInfo {
    pub estimated_time: String,
    pub associated_costs: Option<f64>,
}

impl Default for RecoveryInfo {
    fn default() -> Self {
        Self {
            estimated_time: NOT_AVAILABLE.to_string(),
            associated_costs: None,
        }
    }
}

impl fmt::Display for EstimateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let money = |v: Option<f64>| v.map_or_else(|| NOT_AVAILABLE.to_string(), |c| format!("${c:.2}"));
        write!(
            f,
            "{} ({}) in {}: {} - {} | insured: {} | {} complications | {} alternatives",
            self.procedure_name,
            self.procedure_code,
            self.zip_code,
            money(self.low_estimate),
            money(self.high_estimate),
            money(self.typical_insurance_cost),
            self.common_complications.len(),
            self.alternative_procedures.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure kinds of the estimation pipeline.
///
/// `Clone` because failures are memoized alongside successes. The payload is
/// internal detail for logs; callers only ever see [`EstimateError::user_message`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("LLM response was not valid JSON: {0}")]
    Parse(String),

    #[error("LLM rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("Unexpected estimation error: {0}")]
    Unexpected(String),
}

impl EstimateError {
    /// Message safe to show to the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            EstimateError::Parse(_) => "Unable to parse the estimate. Please try again.",
            EstimateError::RateLimit(_) => "Rate limit exceeded. Please try again later.",
            EstimateError::Api(_) => {
                "An error occurred while fetching the estimate. Please try again."
            }
            EstimateError::Unexpected(_) => {
                "An unexpected error occurred while estimating the cost. Please try again."
            }
        }
    }

    /// Short machine-readable kind, used in logs and stats.
    pub fn kind(&self) -> &'static str {
        match self {
            EstimateError::Parse(_) => "parse",
            EstimateError::RateLimit(_) => "rate_limit",
            EstimateError::Api(_) => "api",
            EstimateError::Unexpected(_) => "unexpected",
        }
    }
}

/// Outcome of one pipeline run, as stored in the memo cache.
pub type EstimateOutcome = Result<EstimateResult, EstimateError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> EstimateResult {
        EstimateResult {
            procedure_name: "MRI Scan".into(),
            procedure_code: "70551".into(),
            zip_code: "10001".into(),
            low_estimate: Some(400.0),
            high_estimate: Some(3500.0),
            typical_insurance_cost: None,
            common_complications: vec![Complication {
                name: "Contrast reaction".into(),
                estimated_cost: Some(250.0),
            }],
            alternative_procedures: vec![AlternativeProcedure {
                name: "CT Scan".into(),
                estimated_cost_range: [Some(300.0), None],
            }],
            recovery_info: RecoveryInfo::default(),
            additional_info: NOT_AVAILABLE.into(),
        }
    }

    #[test]
    fn test_request_display() {
        assert_eq!(EstimateRequest::new("Flu Shot", "10001", "").to_string(), "Flu Shot @ 10001");
        assert_eq!(
            EstimateRequest::new("MRI Scan", "94110", "70551").to_string(),
            "MRI Scan @ 94110 [70551]"
        );
    }

    #[test]
    fn test_request_code_defaults_empty() {
        let req: EstimateRequest =
            serde_json::from_str(r#"{"procedure":"Flu Shot","zip_code":"10001"}"#).unwrap();
        assert_eq!(req.procedure_code, "");
    }

    #[test]
    fn test_result_serializes_schema() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(json["typical_insurance_cost"], serde_json::Value::Null);
        assert_eq!(json["alternative_procedures"][0]["estimated_cost_range"][0], 300.0);
        assert!(json["alternative_procedures"][0]["estimated_cost_range"][1].is_null());
        assert_eq!(json["recovery_info"]["estimated_time"], "N/A");
        assert_eq!(json.as_object().unwrap().len(), 10);
    }

    #[test]
    fn test_result_display() {
        let text = sample_result().to_string();
        assert!(text.contains("$400.00 - $3500.00"));
        assert!(text.contains("insured: N/A"));
    }

    #[test]
    fn test_error_user_messages_hide_detail() {
        let err = EstimateError::Api("HTTP 500: upstream exploded".into());
        assert!(!err.user_message().contains("exploded"));
        assert!(err.to_string().contains("exploded"));
        assert_eq!(err.kind(), "api");
        assert_eq!(
            EstimateError::RateLimit(String::new()).user_message(),
            "Rate limit exceeded. Please try again later."
        );
    }
}
