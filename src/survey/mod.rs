//! # Survey Module
//!
//! Data model, validation and the submission pipeline.
//!
//! A submission moves through three steps:
//!
//! 1. [`validate_body`] turns raw request bytes into a [`SurveySubmission`] or a
//!    [`SubmitError`] naming the first rule that failed.
//! 2. The submission is handed to a [`SubmissionStore`](crate::store::SubmissionStore)
//!    which appends it.
//! 3. [`handle_submission`] maps the outcome to the status code and JSON body the
//!    caller receives.
//!
//! ## Request Body
//!
//! ```json
//! {
//!   "submissionId": "7d0c…",
//!   "groupId": "cohort-a",
//!   "answers": [
//!     { "questionId": 1, "answer": "Often" },
//!     { "questionId": 2, "answer": 4 }
//!   ],
//!   "timestamp": "2024-05-01T10:00:00.000Z"
//! }
//! ```

pub mod error;
pub mod handler;
pub mod model;
pub mod validation;

pub use error::SubmitError;
pub use handler::{handle_submission, submit, SubmitResponse};
pub use model::{AnswerValue, SurveyAnswer, SurveySubmission};
pub use validation::{validate_body, validate_value};
