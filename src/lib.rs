//! # Survey Intake
//!
//! A small HTTP service that accepts survey submissions and appends them to a
//! JSON file, built on the `may` coroutine runtime and `may_minihttp`.
//!
//! ## Overview
//!
//! A client `POST`s one submission to `/api/submit-survey`. The body is
//! validated, and an accepted submission is appended to
//! `data/survey_submissions.json`, which holds every accepted submission as one
//! pretty-printed JSON array in arrival order.
//!
//! ## Architecture
//!
//! - **[`survey`]** - submission model, validation rules and the endpoint handler
//! - **[`store`]** - the JSON file store and the single-writer coroutine in front of it
//! - **[`server`]** - request parsing, routing and the `may_minihttp` listener
//! - **[`config`]** - YAML/env service configuration
//! - **[`runtime_config`]** - `may` runtime tuning from the environment
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `serve` and `check` commands
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as SurveyService
//!     participant Handler as survey::handle_submission
//!     participant Writer as StoreWriter coroutine
//!     participant FS as data/survey_submissions.json
//!
//!     Client->>Service: POST /api/submit-survey
//!     Service->>Handler: body bytes
//!     Handler->>Handler: validate_body
//!     alt invalid
//!         Handler-->>Client: 400 {"error": ...}
//!     else valid
//!         Handler->>Writer: AppendCommand
//!         Writer->>FS: read array
//!         Writer->>FS: write temp file + rename
//!         Writer-->>Handler: record count
//!         Handler-->>Client: 200 {"message": "Survey submitted successfully."}
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use survey_intake::server::{HttpServer, SurveyService};
//! use survey_intake::store::{JsonFileStore, StoreWriter};
//!
//! may::config().set_stack_size(0x10000);
//! let writer = unsafe { StoreWriter::spawn(JsonFileStore::with_defaults(), 0x10000)? };
//! let handle = HttpServer(SurveyService::new(Arc::new(writer))).start("0.0.0.0:8080")?;
//! handle.join().ok();
//! ```

pub mod cli;
pub mod config;
pub mod ids;
pub mod logging;
pub mod runtime_config;
pub mod server;
pub mod store;
pub mod survey;

pub use config::ServiceConfig;
pub use ids::RequestId;
pub use server::{HttpServer, ServerHandle, SurveyService};
pub use store::{CorruptStorePolicy, JsonFileStore, StoreError, StoreWriter, SubmissionStore};
pub use survey::{
    handle_submission, submit, validate_body, SubmitError, SubmitResponse, SurveyAnswer,
    SurveySubmission,
};
