//! Inbound message decoding and validation
//!
//! Wire format (one JSON object per text frame):
//!
//! ```text
//! { "vibration_data": [0.0, 1.0, 0.0, -1.0], "sampling_rate": 8 }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::pipeline::PipelineError;
use crate::types::AnalysisRequest;

pub const FIELD_VIBRATION_DATA: &str = "vibration_data";
pub const FIELD_SAMPLING_RATE: &str = "sampling_rate";

/// Raw request shape. `None` covers both an absent key and an explicit `null`.
#[derive(Debug, Deserialize)]
struct WireRequest {
    vibration_data: Option<Vec<f64>>,
    sampling_rate: Option<f64>,
}

/// Parse and validate one inbound payload.
///
/// # Errors
/// - [`PipelineError::Decode`] for invalid JSON, a non-object payload, or a field
///   of the wrong type
/// - [`PipelineError::MissingField`] when either field is absent
/// - [`PipelineError::Validation`] for empty samples or a non-positive rate
pub fn decode(raw: &str) -> Result<AnalysisRequest, PipelineError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| PipelineError::Decode(e.to_string()))?;

    // Checked up front so a bare array is not deserialized positionally.
    if !value.is_object() {
        return Err(PipelineError::Decode(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )));
    }

    let wire: WireRequest =
        serde_json::from_value(value).map_err(|e| PipelineError::Decode(e.to_string()))?;

    let samples = wire
        .vibration_data
        .ok_or(PipelineError::MissingField(FIELD_VIBRATION_DATA))?;
    let sampling_rate = wire
        .sampling_rate
        .ok_or(PipelineError::MissingField(FIELD_SAMPLING_RATE))?;

    if samples.is_empty() {
        return Err(PipelineError::Validation(format!(
            "{FIELD_VIBRATION_DATA} must not be empty"
        )));
    }
    if sampling_rate <= 0.0 {
        return Err(PipelineError::Validation(format!(
            "{FIELD_SAMPLING_RATE} must be positive, got {sampling_rate}"
        )));
    }

    Ok(AnalysisRequest::new(samples, sampling_rate))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
