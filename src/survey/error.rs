use crate::store::StoreError;
use serde_json::{json, Value};
use std::fmt;

/// Everything that can stop a submission from being stored.
///
/// The first five variants are caller mistakes and are reported with their own
/// message before any I/O happens. [`SubmitError::StorageFailure`] carries the
/// internal cause for logging; callers only ever see the generic 500 body.
#[derive(Debug)]
pub enum SubmitError {
    /// Body is not valid JSON (includes an empty body)
    MalformedBody,
    /// One of `submissionId`, `groupId`, `answers`, `timestamp` is absent or falsy
    MissingFields,
    /// `answers` is not an array or is empty
    InvalidAnswers,
    /// `groupId` is blank after trimming
    EmptyGroupId,
    /// `groupId` is truthy but not a string
    InvalidFieldTypes,
    /// The store could not be read, parsed or rewritten
    StorageFailure(StoreError),
}

pub const MALFORMED_BODY_MESSAGE: &str = "Invalid JSON format in request body";
pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: submissionId, groupId, answers, or timestamp";
pub const INVALID_ANSWERS_MESSAGE: &str = "Answers must be a non-empty array";
pub const EMPTY_GROUP_ID_MESSAGE: &str = "GroupId cannot be empty";
pub const INVALID_FIELD_TYPES_MESSAGE: &str = "Invalid field types: groupId must be a string";
pub const STORAGE_FAILURE_MESSAGE: &str =
    "Internal server error occurred while submitting survey";
pub const SUCCESS_MESSAGE: &str = "Survey submitted successfully.";

impl SubmitError {
    /// HTTP status reported for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            SubmitError::StorageFailure(_) => 500,
            _ => 400,
        }
    }

    /// Message placed in the `error` field of the response body.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            SubmitError::MalformedBody => MALFORMED_BODY_MESSAGE,
            SubmitError::MissingFields => MISSING_FIELDS_MESSAGE,
            SubmitError::InvalidAnswers => INVALID_ANSWERS_MESSAGE,
            SubmitError::EmptyGroupId => EMPTY_GROUP_ID_MESSAGE,
            SubmitError::InvalidFieldTypes => INVALID_FIELD_TYPES_MESSAGE,
            SubmitError::StorageFailure(_) => STORAGE_FAILURE_MESSAGE,
        }
    }

    /// Response body: `{ "error": <public message> }`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({ "error": self.public_message() })
    }

    /// Short machine-readable name used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::MalformedBody => "malformed_body",
            SubmitError::MissingFields => "missing_fields",
            SubmitError::InvalidAnswers => "invalid_answers",
            SubmitError::EmptyGroupId => "empty_group_id",
            SubmitError::InvalidFieldTypes => "invalid_field_types",
            SubmitError::StorageFailure(_) => "storage_failure",
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::StorageFailure(e) => write!(f, "storage failure: {e}"),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::StorageFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        SubmitError::StorageFailure(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validation_errors_are_400() {
        for err in [
            SubmitError::MalformedBody,
            SubmitError::MissingFields,
            SubmitError::InvalidAnswers,
            SubmitError::EmptyGroupId,
            SubmitError::InvalidFieldTypes,
        ] {
            assert_eq!(err.status(), 400, "{}", err.kind());
        }
    }

    #[test]
    fn test_storage_failure_hides_detail() {
        let err = SubmitError::from(StoreError::Io {
            path: PathBuf::from("/secret/data"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.status(), 500);
        let body = err.to_body().to_string();
        assert!(!body.contains("/secret/data"));
        assert_eq!(
            err.to_body(),
            json!({ "error": "Internal server error occurred while submitting survey" })
        );
        assert!(err.to_string().contains("/secret/data"));
    }
}
