use super::{CorruptStorePolicy, StoreError, SubmissionStore};
use crate::survey::validation::{exceeds_depth, MAX_JSON_DEPTH};
use crate::survey::SurveySubmission;
use serde_json::Value;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Directory the store lives in, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";
/// File name of the store inside the data directory.
pub const DEFAULT_STORE_FILE: &str = "survey_submissions.json";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Submission store backed by a single pretty-printed JSON array.
///
/// This type performs no locking. Concurrent [`SubmissionStore::append`]
/// calls on the same file can lose updates; wrap it in a
/// [`StoreWriter`](super::StoreWriter) when more than one request may append
/// at a time.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    path: PathBuf,
    policy: CorruptStorePolicy,
}

impl JsonFileStore {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        file_name: impl AsRef<Path>,
        policy: CorruptStorePolicy,
    ) -> Self {
        let data_dir = data_dir.into();
        let path = data_dir.join(file_name);
        Self {
            data_dir,
            path,
            policy,
        }
    }

    /// `data/survey_submissions.json` under the current working directory.
    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_DATA_DIR,
            DEFAULT_STORE_FILE,
            CorruptStorePolicy::default(),
        )
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn policy(&self) -> CorruptStorePolicy {
        self.policy
    }

    /// Create the data directory and any missing parents.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Read every stored record.
    ///
    /// Records are returned as raw JSON values; only the top-level array is
    /// checked. A missing file is an empty store. A present file that cannot be
    /// read, is not a JSON array, or nests deeper than one record may is an
    /// error under [`CorruptStorePolicy::Reject`] and an empty store under
    /// [`CorruptStorePolicy::Overwrite`].
    pub fn load(&self) -> Result<Vec<Value>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Creating new survey submissions file");
                return Ok(Vec::new());
            }
            Err(source) => {
                return self.on_unreadable(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        // The array itself adds one level on top of each record.
        if exceeds_depth(text.as_bytes(), MAX_JSON_DEPTH + 1) {
            return self.on_unreadable(StoreError::TooDeep {
                path: self.path.clone(),
                limit: MAX_JSON_DEPTH + 1,
            });
        }

        match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(records) => {
                debug!(
                    path = %self.path.display(),
                    records = records.len(),
                    bytes = text.len(),
                    "Store loaded"
                );
                Ok(records)
            }
            Err(source) => self.on_unreadable(StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn on_unreadable(&self, err: StoreError) -> Result<Vec<Value>, StoreError> {
        match self.policy {
            CorruptStorePolicy::Reject => Err(err),
            CorruptStorePolicy::Overwrite => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Store file unreadable - treating as empty, contents will be overwritten"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the store contents with `records`.
    ///
    /// Writes a temporary sibling file, syncs it and renames it over the store,
    /// so readers see either the old array or the new one.
    pub fn write_all(&self, records: &[Value]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
        let tmp = self.data_dir.join(format!(
            ".{}.tmp.{}.{}",
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("store"),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        {
            let mut f = File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
            f.write_all(&bytes).map_err(|e| io_err(&tmp, e))?;
            f.sync_all().map_err(|e| io_err(&tmp, e))?;
        }
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        if let Ok(dir) = File::open(&self.data_dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}

fn io_err(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SubmissionStore for JsonFileStore {
    fn append(&self, submission: SurveySubmission) -> Result<usize, StoreError> {
        let start = Instant::now();
        let record = serde_json::to_value(&submission).map_err(StoreError::Serialize)?;
        self.ensure_dir()?;
        let mut records = self.load()?;
        records.push(record);
        self.write_all(&records)?;
        debug!(
            path = %self.path.display(),
            records = records.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Store rewritten"
        );
        Ok(records.len())
    }
}
