//! Sanitization of raw LLM output into an [`EstimateResult`].
//!
//! The model's JSON is untrusted in presence, type and range of every field.
//! [`normalize`] is total over any `serde_json::Value`: wrong shapes degrade
//! to defaults instead of failing.
//!
//! Policies:
//! - costs: numbers and numeric strings coerce to `f64`, negatives clamp to
//!   `0`, everything else (including non-finite values) becomes `None`;
//! - strings: missing or `null` becomes `"N/A"`, strings pass through,
//!   numbers and booleans are rendered as text, arrays and objects become
//!   `"N/A"`;
//! - a non-object where an object is expected is read as an empty object.
//!
//! serde_json is built with `arbitrary_precision`, so a number outside the
//! `f64` range still parses and is dropped here as non-finite.

use serde_json::Value;

use crate::types::{
    AlternativeProcedure, Complication, EstimateError, EstimateResult, RecoveryInfo, NOT_AVAILABLE,
};

/// Parse the raw response body and normalize it.
pub fn parse_estimate(raw: &str) -> Result<EstimateResult, EstimateError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| EstimateError::Parse(e.to_string()))?;
    Ok(normalize(&value))
}

/// Coerce a loosely-typed cost into `None` or a non-negative number.
pub fn sanitize_cost(value: Option<&Value>) -> Option<f64> {
    let cost = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !cost.is_finite() {
        return None;
    }
    // `f64::max` would keep -0.0.
    Some(if cost > 0.0 { cost } else { 0.0 })
}

/// Build a fully-populated [`EstimateResult`] from arbitrary JSON.
///
/// `Value::get` yields `None` on anything that is not an object, so wrong
/// shapes at any depth fall through to the defaults.
pub fn normalize(data: &Value) -> EstimateResult {
    EstimateResult {
        procedure_name: text_field(data.get("procedure_name")),
        procedure_code: text_field(data.get("procedure_code")),
        zip_code: text_field(data.get("zip_code")),
        low_estimate: sanitize_cost(data.get("low_estimate")),
        high_estimate: sanitize_cost(data.get("high_estimate")),
        typical_insurance_cost: sanitize_cost(data.get("typical_insurance_cost")),
        common_complications: items(data.get("common_complications"))
            .map(|c| Complication {
                name: text_field(c.get("name")),
                estimated_cost: sanitize_cost(c.get("estimated_cost")),
            })
            .collect(),
        alternative_procedures: items(data.get("alternative_procedures"))
            .map(|p| AlternativeProcedure {
                name: text_field(p.get("name")),
                estimated_cost_range: cost_range(p.get("estimated_cost_range")),
            })
            .collect(),
        recovery_info: recovery_info(data.get("recovery_info")),
        additional_info: text_field(data.get("additional_info")),
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Elements of an array in source order; a missing or non-array value
/// yields nothing.
fn items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value.and_then(Value::as_array).into_iter().flatten()
}

fn cost_range(value: Option<&Value>) -> [Option<f64>; 2] {
    match value.and_then(Value::as_array) {
        Some(bounds) => [sanitize_cost(bounds.first()), sanitize_cost(bounds.get(1))],
        None => [None, None],
    }
}

fn recovery_info(value: Option<&Value>) -> RecoveryInfo {
    match value {
        Some(info) if info.is_object() => RecoveryInfo {
            estimated_time: text_field(info.get("estimated_time")),
            associated_costs: sanitize_cost(info.get("associated_costs")),
        },
        _ => RecoveryInfo::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
