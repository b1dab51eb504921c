use serde_json::Value;
use thiserror::Error;

use super::analysis_model::{ParsedAnalysis, Sentiment};

/// Why an inference payload was rejected. Validation is all-or-nothing; a
/// best-effort partial object is never produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' has the wrong type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' value '{value}' is not in the allowed set")]
    InvalidEnum { field: &'static str, value: String },

    #[error("field '{field}' value {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("field '{0}' must not be empty")]
    Empty(&'static str),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

fn required<'a>(
    payload: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, PayloadValidationError> {
    match payload.get(field) {
        Some(Value::Null) | None => Err(PayloadValidationError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn string_field(
    payload: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, PayloadValidationError> {
    let value = required(payload, field)?;
    let s = value.as_str().ok_or(PayloadValidationError::WrongType {
        field,
        expected: "string",
    })?;
    if s.trim().is_empty() {
        return Err(PayloadValidationError::Empty(field));
    }
    Ok(s.to_string())
}

fn number_in_range(
    payload: &serde_json::Map<String, Value>,
    field: &'static str,
    min: f64,
    max: f64,
) -> Result<f64, PayloadValidationError> {
    let value = required(payload, field)?;
    let n = value.as_f64().ok_or(PayloadValidationError::WrongType {
        field,
        expected: "number",
    })?;
    if !n.is_finite() || n < min || n > max {
        return Err(PayloadValidationError::OutOfRange {
            field,
            value: n,
            min,
            max,
        });
    }
    Ok(n)
}

/// Validates a structured inference payload against the analysis schema.
pub fn validate_payload(payload: &Value) -> Result<ParsedAnalysis, PayloadValidationError> {
    let object = payload
        .as_object()
        .ok_or(PayloadValidationError::NotAnObject)?;

    let sentiment_raw = string_field(object, "sentiment")?;
    let sentiment =
        Sentiment::parse(&sentiment_raw).ok_or_else(|| PayloadValidationError::InvalidEnum {
            field: "sentiment",
            value: sentiment_raw,
        })?;

    let sentiment_score = number_in_range(object, "sentiment_score", -1.0, 1.0)?;
    let confidence = number_in_range(object, "confidence", 0.0, 1.0)?;

    let themes_value = required(object, "themes")?;
    let themes_array = themes_value
        .as_array()
        .ok_or(PayloadValidationError::WrongType {
            field: "themes",
            expected: "array of strings",
        })?;
    let mut themes = Vec::with_capacity(themes_array.len());
    for item in themes_array {
        let theme = item.as_str().ok_or(PayloadValidationError::WrongType {
            field: "themes",
            expected: "array of strings",
        })?;
        if !theme.trim().is_empty() {
            themes.push(theme.to_string());
        }
    }

    let summary = string_field(object, "summary")?;
    let narrative = string_field(object, "narrative")?;

    Ok(ParsedAnalysis {
        sentiment,
        sentiment_score,
        confidence,
        themes,
        summary,
        narrative,
    })
}
