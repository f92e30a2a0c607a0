use super::request::{parse_request, ParsedRequest};
use super::response::write_json;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::store::SubmissionStore;
use crate::survey::handle_submission;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Path of the submission endpoint.
pub const SUBMIT_PATH: &str = "/api/submit-survey";
/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// HTTP service exposing the submission endpoint.
///
/// Cloned once per connection by `may_minihttp`; every clone shares the same
/// store handle.
#[derive(Clone)]
pub struct SurveyService {
    store: Arc<dyn SubmissionStore>,
}

impl SurveyService {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_json(res, 200, &json!({ "status": "ok" }));
    Ok(())
}

impl HttpService for SurveyService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let request_id = RequestId::from_header_or_new(parsed.get_header(REQUEST_ID_HEADER));
        let ParsedRequest {
            method, path, body, ..
        } = parsed;

        match (method.as_str(), path.as_str()) {
            ("GET", HEALTH_PATH) => health_endpoint(res),
            ("POST", SUBMIT_PATH) => {
                let outcome = handle_submission(self.store.as_ref(), &body, request_id);
                debug!(
                    request_id = %request_id,
                    status = outcome.status,
                    "Submission response"
                );
                write_json(res, outcome.status, &outcome.body);
                Ok(())
            }
            (_, SUBMIT_PATH) => {
                write_json(res, 405, &json!({ "error": "Method Not Allowed" }));
                Ok(())
            }
            _ => {
                debug!(request_id = %request_id, method = %method, path = %path, "No route");
                write_json(
                    res,
                    404,
                    &json!({ "error": "Not Found", "method": method, "path": path }),
                );
                Ok(())
            }
        }
    }
}
