use super::{StoreError, SubmissionStore};
use crate::survey::SurveySubmission;
use may::coroutine;
use may::sync::mpsc;
use std::io;
use std::time::Instant;
use tracing::{debug, error, info};

/// Work for the writer coroutine. Commands run strictly in arrival order.
enum WriterCommand {
    /// Append one submission and reply with the result.
    Append {
        submission: SurveySubmission,
        reply_tx: mpsc::Sender<Result<usize, StoreError>>,
    },
    /// Reply once every earlier command has finished, with the number of
    /// appends handled so far.
    Flush { reply_tx: mpsc::Sender<u64> },
}

/// Single writer in front of a [`SubmissionStore`].
///
/// The wrapped store is moved into one coroutine that handles append commands
/// strictly one after another. Cloned handles all feed the same queue, so the
/// read-modify-write cycles of concurrent requests never overlap.
///
/// The coroutine exits once every handle has been dropped. Call
/// [`StoreWriter::flush`] before shutting down to wait for queued appends.
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::Sender<WriterCommand>,
}

impl StoreWriter {
    /// Move `store` into a new writer coroutine.
    ///
    /// # Safety
    ///
    /// This function is marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure the May coroutine
    /// runtime is configured (stack size set) before the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the coroutine cannot be spawned.
    pub unsafe fn spawn<S>(store: S, stack_size: usize) -> io::Result<Self>
    where
        S: SubmissionStore + 'static,
    {
        let (tx, rx) = mpsc::channel::<WriterCommand>();

        // SAFETY: see the function-level contract above.
        unsafe {
            coroutine::Builder::new()
                .name("store-writer".to_string())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(stack_size = stack_size, "Store writer start");
                    let mut handled: u64 = 0;
                    for cmd in rx.iter() {
                        let (submission, reply_tx) = match cmd {
                            WriterCommand::Append {
                                submission,
                                reply_tx,
                            } => (submission, reply_tx),
                            WriterCommand::Flush { reply_tx } => {
                                let _ = reply_tx.send(handled);
                                continue;
                            }
                        };
                        handled += 1;
                        let submission_id = submission.submission_id.clone();
                        let group_id = submission.group_id.clone();
                        let start = Instant::now();

                        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                            || store.append(submission),
                        ))
                        .unwrap_or_else(|panic| {
                            let panic_message = format!("{panic:?}");
                            error!(
                                submission_id = %submission_id,
                                panic_message = %panic_message,
                                "Store writer panicked - CRITICAL"
                            );
                            Err(StoreError::WriterPanicked(panic_message))
                        });

                        if let Ok(records) = &result {
                            info!(
                                submission_id = %submission_id,
                                group_id = %group_id,
                                records = *records,
                                latency_ms = start.elapsed().as_millis() as u64,
                                "Submission appended"
                            );
                        }

                        // The requester may have gone away; nothing to do then.
                        let _ = reply_tx.send(result);
                    }
                    debug!("Store writer exit");
                })?;
        }

        Ok(Self { tx })
    }

    /// Block until every command queued before this call has been handled.
    ///
    /// Returns the number of appends the writer has processed since it started.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriterUnavailable`] if the writer has exited.
    pub fn flush(&self) -> Result<u64, StoreError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(WriterCommand::Flush { reply_tx })
            .map_err(|_| StoreError::WriterUnavailable)?;
        reply_rx.recv().map_err(|_| StoreError::WriterUnavailable)
    }
}

impl SubmissionStore for StoreWriter {
    fn append(&self, submission: SurveySubmission) -> Result<usize, StoreError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(WriterCommand::Append {
                submission,
                reply_tx,
            })
            .map_err(|_| StoreError::WriterUnavailable)?;
        reply_rx
            .recv()
            .map_err(|_| StoreError::WriterUnavailable)?
    }
}
