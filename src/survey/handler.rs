use super::error::{SubmitError, SUCCESS_MESSAGE};
use super::validation::validate_body;
use crate::ids::RequestId;
use crate::store::SubmissionStore;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of one submission: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: Value,
}

impl SubmitResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: json!({ "message": SUCCESS_MESSAGE }),
        }
    }

    #[must_use]
    pub fn from_error(err: &SubmitError) -> Self {
        Self {
            status: err.status(),
            body: err.to_body(),
        }
    }
}

/// Validate `body` and append it to `store`.
///
/// Validation finishes before the store is touched, so a rejected body never
/// causes I/O.
pub fn submit(store: &dyn SubmissionStore, body: &[u8]) -> Result<usize, SubmitError> {
    let submission = validate_body(body)?;
    let records = store.append(submission)?;
    Ok(records)
}

/// Run [`submit`] and map the result to the response sent to the caller.
///
/// Storage failures are logged with their full cause; the caller only gets the
/// generic 500 body.
pub fn handle_submission(
    store: &dyn SubmissionStore,
    body: &[u8],
    request_id: RequestId,
) -> SubmitResponse {
    let start = Instant::now();
    match submit(store, body) {
        Ok(records) => {
            info!(
                request_id = %request_id,
                records = records,
                latency_ms = start.elapsed().as_millis() as u64,
                "Survey submitted"
            );
            SubmitResponse::ok()
        }
        Err(err @ SubmitError::StorageFailure(_)) => {
            error!(
                request_id = %request_id,
                error = %err,
                latency_ms = start.elapsed().as_millis() as u64,
                "Error submitting survey"
            );
            SubmitResponse::from_error(&err)
        }
        Err(err) => {
            warn!(
                request_id = %request_id,
                kind = err.kind(),
                body_size_bytes = body.len(),
                "Survey submission rejected"
            );
            SubmitResponse::from_error(&err)
        }
    }
}
