//! Request body validation for the submission endpoint.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. body nests no deeper than [`MAX_JSON_DEPTH`] and parses as JSON
//!    ([`SubmitError::MalformedBody`])
//! 2. `submissionId`, `groupId`, `answers`, `timestamp` are all truthy
//!    ([`SubmitError::MissingFields`])
//! 3. `answers` is a non-empty array ([`SubmitError::InvalidAnswers`])
//! 4. `groupId` is a string that is not blank after trimming
//!    ([`SubmitError::InvalidFieldTypes`] / [`SubmitError::EmptyGroupId`])
//!
//! Individual answer entries are never inspected. `submissionId` and
//! `timestamp` only have to be truthy; non-string values are stored as sent.

use super::error::SubmitError;
use super::model::SurveySubmission;
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 4] = ["submissionId", "groupId", "answers", "timestamp"];

/// Deepest array/object nesting accepted in a body or a stored record.
///
/// Parsing and the untagged answer model both recurse per level, and a
/// coroutine stack overflow aborts the process.
pub const MAX_JSON_DEPTH: usize = 32;

/// True when `bytes` opens more than `limit` nested arrays or objects.
///
/// Scans without recursing, so it is safe to run on hostile input before any
/// parser sees it. Brackets inside string literals are ignored.
#[must_use]
pub fn exceeds_depth(bytes: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Truthiness as the submission contract defines it: `null`, `false`, `0`,
/// and `""` are falsy, every array and object is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse raw body bytes and validate them.
pub fn validate_body(body: &[u8]) -> Result<SurveySubmission, SubmitError> {
    if exceeds_depth(body, MAX_JSON_DEPTH) {
        return Err(SubmitError::MalformedBody);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| SubmitError::MalformedBody)?;
    validate_value(value)
}

/// Validate an already parsed body.
///
/// Callers holding untrusted bytes should go through [`validate_body`], which
/// bounds nesting depth first.
pub fn validate_value(value: Value) -> Result<SurveySubmission, SubmitError> {
    let fields = match &value {
        Value::Object(map) => map,
        _ => return Err(SubmitError::MissingFields),
    };

    let all_present = REQUIRED_FIELDS
        .iter()
        .all(|name| fields.get(*name).is_some_and(is_truthy));
    if !all_present {
        return Err(SubmitError::MissingFields);
    }

    match fields.get("answers") {
        Some(Value::Array(answers)) if !answers.is_empty() => {}
        _ => return Err(SubmitError::InvalidAnswers),
    }

    match fields.get("groupId") {
        Some(Value::String(group_id)) => {
            if group_id.trim().is_empty() {
                return Err(SubmitError::EmptyGroupId);
            }
        }
        _ => return Err(SubmitError::InvalidFieldTypes),
    }

    serde_json::from_value(value).map_err(|_| SubmitError::InvalidFieldTypes)
}
