//! # Store Module
//!
//! Persistence for accepted submissions.
//!
//! ## Overview
//!
//! The store is one JSON file holding an array of records in arrival order. New
//! records are serialized [`SurveySubmission`]s; existing ones are only required
//! to be JSON values, so older or hand-edited entries survive every rewrite. Every append is a full read, an in-memory push and an atomic
//! full rewrite.
//!
//! - [`JsonFileStore`] does the file work and nothing else. It has no locking of
//!   its own.
//! - [`StoreWriter`] owns a store inside a dedicated coroutine and serializes
//!   every append through a channel, so two requests never interleave their
//!   read-modify-write cycles inside one process.
//!
//! Request handling only sees the [`SubmissionStore`] trait, which both types
//! implement. Swapping the JSON file for a transactional store means writing one
//! more implementation.
//!
//! ## Missing and corrupt files
//!
//! A missing store file is the normal first-submission case and reads as an
//! empty array. A file that exists but cannot be read or parsed is handled by
//! [`CorruptStorePolicy`].

mod json_file;
mod writer;

pub use json_file::{JsonFileStore, DEFAULT_DATA_DIR, DEFAULT_STORE_FILE};
pub use writer::StoreWriter;

use crate::survey::SurveySubmission;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Something that can durably append one submission.
pub trait SubmissionStore: Send + Sync {
    /// Append `submission` after every record already stored.
    ///
    /// Returns the number of records in the store after the append.
    fn append(&self, submission: SurveySubmission) -> Result<usize, StoreError>;
}

/// What to do when the store file exists but does not hold a valid array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptStorePolicy {
    /// Fail the append and leave the file untouched.
    #[default]
    Reject,
    /// Treat the file as empty; the next write replaces its contents.
    Overwrite,
}

impl CorruptStorePolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptStorePolicy::Reject => "reject",
            CorruptStorePolicy::Overwrite => "overwrite",
        }
    }
}

impl FromStr for CorruptStorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(CorruptStorePolicy::Reject),
            "overwrite" => Ok(CorruptStorePolicy::Overwrite),
            other => Err(format!(
                "invalid corrupt store policy '{other}' (expected 'reject' or 'overwrite')"
            )),
        }
    }
}

impl fmt::Display for CorruptStorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store failure. Always surfaced to HTTP callers as a generic 500.
#[derive(Debug)]
pub enum StoreError {
    /// Directory creation, read, write or rename failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The existing store file is not a JSON array
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The existing store file nests deeper than the parser is allowed to go
    TooDeep { path: PathBuf, limit: usize },
    /// The records could not be serialized
    Serialize(serde_json::Error),
    /// The writer coroutine is gone or dropped the reply
    WriterUnavailable,
    /// The writer caught a panic while appending
    WriterPanicked(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "store I/O error at '{}': {}", path.display(), source)
            }
            StoreError::Corrupt { path, source } => write!(
                f,
                "store file '{}' is not a JSON array: {}",
                path.display(),
                source
            ),
            StoreError::TooDeep { path, limit } => write!(
                f,
                "store file '{}' nests deeper than {} levels",
                path.display(),
                limit
            ),
            StoreError::Serialize(e) => write!(f, "failed to serialize submissions: {e}"),
            StoreError::WriterUnavailable => f.write_str("store writer is not running"),
            StoreError::WriterPanicked(msg) => write!(f, "store writer panicked: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Corrupt { source, .. } => Some(source),
            StoreError::Serialize(e) => Some(e),
            StoreError::TooDeep { .. }
            | StoreError::WriterUnavailable
            | StoreError::WriterPanicked(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "reject".parse::<CorruptStorePolicy>(),
            Ok(CorruptStorePolicy::Reject)
        );
        assert_eq!(
            " Overwrite ".parse::<CorruptStorePolicy>(),
            Ok(CorruptStorePolicy::Overwrite)
        );
        assert!("drop".parse::<CorruptStorePolicy>().is_err());
        assert_eq!(CorruptStorePolicy::default(), CorruptStorePolicy::Reject);
    }
}
