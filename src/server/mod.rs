//! # Server Module
//!
//! HTTP plumbing on top of `may_minihttp`.
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | `POST` | `/api/submit-survey` | submission result (200 / 400 / 500) |
//! | `GET` | `/health` | `200 {"status":"ok"}` |
//! | other | `/api/submit-survey` | `405` |
//! | any | anything else | `404` |
//!
//! Every connection runs in its own `may` coroutine. Request parsing lives in
//! [`request`], response writing in [`response`], routing in [`service`] and the
//! listener lifecycle in [`http_server`].

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, HeaderVec, ParsedRequest};
pub use service::{health_endpoint, SurveyService, HEALTH_PATH, SUBMIT_PATH};
