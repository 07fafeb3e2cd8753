//! The deletion engine.
//!
//! # Strategies
//!
//! - [`Strategy::StandardDelete`]: unlink the file.
//! - [`Strategy::SecureOverwrite`]: overwrite every byte in place with data
//!   from the operating system's CSPRNG, flush to storage, then unlink.
//!
//! # Progress
//!
//! During an overwrite, every byte index that is a multiple of
//! [`PROGRESS_SAMPLE_INTERVAL`] is a sample point worth
//! `floor(index * 100 / len)` percent. Writes are batched into chunks; after
//! each chunk the engine reports the last sample the chunk covered, skipping
//! repeats. 100% is reported only after the file has been removed.
//!
//! # Interruption
//!
//! Two flags are checked before every chunk: the engine-wide flag (usually
//! the Ctrl+C flag, see [`DeletionEngine::with_cancel_flag`]) and the token of
//! the request itself (see [`DeletionEngine::execute_cancellable`]). A stopped overwrite
//! syncs what it wrote and leaves the file in place with its original length:
//! a prefix is random, the rest untouched. Re-running the overwrite simply
//! starts again from offset 0.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wipefinity::erase::{DeletionEngine, ErasureRequest, NullSink};
//! use wipefinity::oplog::FacadeLog;
//!
//! let engine = DeletionEngine::new(Arc::new(FacadeLog));
//! let outcome = engine.execute(ErasureRequest::secure("/tmp/secret.txt"), &NullSink);
//! println!("{outcome}");
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::Level;
use rand::rngs::OsRng;
use rand::RngCore;

use super::outcome::{ErasureError, ErasureRequest, ErrorKind, Outcome, ProgressUpdate, Strategy};
use super::sink::ProgressSink;
use crate::oplog::OperationLog;

/// Byte interval between progress sample points.
pub const PROGRESS_SAMPLE_INTERVAL: u64 = 100;

/// Default number of random bytes written per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Tunables for the deletion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bytes written per overwrite chunk (at least 1).
    pub chunk_size: usize,
    /// Stop the overwrite after this many bytes, as if cancelled.
    pub interrupt_after: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            interrupt_after: None,
        }
    }
}

impl EngineConfig {
    /// Set the overwrite chunk size. Zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Stop every overwrite after `bytes` bytes.
    ///
    /// Used to exercise the interrupted-overwrite path deterministically.
    #[doc(hidden)]
    #[must_use]
    pub fn interrupt_after(mut self, bytes: u64) -> Self {
        self.interrupt_after = Some(bytes);
        self
    }
}

/// How an overwrite pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Complete,
    Stopped { overwritten: u64 },
}

/// Executes erasure requests against the filesystem.
///
/// The engine holds no per-request state, so one instance can serve many
/// sequential requests, and it may be moved to a worker thread (see
/// [`super::worker`]). Erasing the same path from two threads at once is
/// the caller's responsibility to prevent.
///
/// # Cancellation
///
/// Stopping a single request goes through its own token
/// ([`Self::execute_cancellable`], [`super::ErasureHandle::cancel`]) and never
/// affects later requests. [`Self::cancel`] is engine-wide: it stays set until
/// [`Self::reset_cancel`], like a shutdown flag.
pub struct DeletionEngine {
    log: Arc<dyn OperationLog>,
    config: EngineConfig,
    cancel: Arc<AtomicBool>,
}

impl std::fmt::Debug for DeletionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeletionEngine")
            .field("config", &self.config)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl DeletionEngine {
    /// Create an engine that records outcomes to `log`.
    #[must_use]
    pub fn new(log: Arc<dyn OperationLog>) -> Self {
        Self {
            log,
            config: EngineConfig::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = EngineConfig {
            chunk_size: config.chunk_size.max(1),
            ..config
        };
        self
    }

    /// Share an externally owned cancellation flag (e.g. the Ctrl+C flag).
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle to the cancellation flag.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Stop every in-flight and future overwrite at its next chunk boundary.
    ///
    /// The flag stays set until [`Self::reset_cancel`] is called.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Clear the engine-wide cancellation flag.
    pub fn reset_cancel(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    /// Whether engine-wide cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Run one erasure request.
    ///
    /// Progress goes to `sink`, then the outcome is delivered to `sink` and
    /// returned. No I/O error escapes this call.
    pub fn execute<S: ProgressSink + ?Sized>(&self, request: ErasureRequest, sink: &S) -> Outcome {
        self.execute_cancellable(request, sink, &AtomicBool::new(false))
    }

    /// Run one erasure request that can also be stopped through `token`.
    ///
    /// Setting `token` stops only this request; the engine stays usable.
    pub fn execute_cancellable<S: ProgressSink + ?Sized>(
        &self,
        request: ErasureRequest,
        sink: &S,
        token: &AtomicBool,
    ) -> Outcome {
        log::debug!(
            "Executing {} on {}",
            request.strategy,
            request.path.display()
        );

        let outcome = match request.strategy {
            Strategy::StandardDelete => self.standard_delete(&request.path, sink),
            Strategy::SecureOverwrite => self.secure_overwrite(&request.path, sink, token),
        };

        self.record(&request, &outcome);
        sink.on_outcome(&outcome);
        outcome
    }

    fn standard_delete<S: ProgressSink + ?Sized>(&self, path: &Path, sink: &S) -> Outcome {
        match fs::remove_file(path) {
            Ok(()) => {
                sink.on_progress(ProgressUpdate::COMPLETE);
                Outcome::Success
            }
            Err(source) => ErasureError::Unlink {
                path: path.to_path_buf(),
                source,
            }
            .into(),
        }
    }

    fn secure_overwrite<S: ProgressSink + ?Sized>(
        &self,
        path: &Path,
        sink: &S,
        token: &AtomicBool,
    ) -> Outcome {
        match self.overwrite_and_unlink(path, sink, token) {
            Ok(Pass::Complete) => {
                sink.on_progress(ProgressUpdate::COMPLETE);
                Outcome::Success
            }
            Ok(Pass::Stopped { overwritten }) => Outcome::Cancelled { overwritten },
            Err(e) => e.into(),
        }
    }

    fn overwrite_and_unlink<S: ProgressSink + ?Sized>(
        &self,
        path: &Path,
        sink: &S,
        token: &AtomicBool,
    ) -> Result<Pass, ErasureError> {
        let len = fs::metadata(path)
            .map_err(|source| ErasureError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        // In place: no truncate, no create, so the original blocks are rewritten.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ErasureError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("Overwriting {} bytes of {}", len, path.display());
        let pass = self.overwrite(&mut file, path, len, sink, token)?;

        file.sync_all().map_err(|source| ErasureError::Sync {
            path: path.to_path_buf(),
            source,
        })?;
        drop(file);

        if pass != Pass::Complete {
            return Ok(pass);
        }

        fs::remove_file(path).map_err(|source| ErasureError::Unlink {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Pass::Complete)
    }

    /// Write `len` random bytes to `writer` in chunks, reporting progress.
    fn overwrite<W: Write, S: ProgressSink + ?Sized>(
        &self,
        writer: &mut W,
        path: &Path,
        len: u64,
        sink: &S,
        token: &AtomicBool,
    ) -> Result<Pass, ErasureError> {
        if len == 0 {
            return Ok(Pass::Complete);
        }

        let limit = self.config.interrupt_after.map_or(len, |n| n.min(len));
        let chunk_len = usize::try_from(len)
            .unwrap_or(usize::MAX)
            .min(self.config.chunk_size.max(1));
        let mut buffer = vec![0u8; chunk_len];
        let mut rng = OsRng;
        let mut tracker = ProgressTracker::new(len);
        let mut offset = 0u64;

        while offset < len {
            if offset >= limit || self.is_cancelled() || token.load(Ordering::SeqCst) {
                log::warn!(
                    "Overwrite of {} stopped after {} of {} bytes",
                    path.display(),
                    offset,
                    len
                );
                writer.flush().map_err(|source| ErasureError::Write {
                    path: path.to_path_buf(),
                    offset,
                    source,
                })?;
                return Ok(Pass::Stopped {
                    overwritten: offset,
                });
            }

            let end = offset.saturating_add(chunk_len as u64).min(limit);
            let chunk = &mut buffer[..(end - offset) as usize];

            rng.try_fill_bytes(chunk)
                .map_err(|e| ErasureError::Entropy {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            writer
                .write_all(chunk)
                .map_err(|source| ErasureError::Write {
                    path: path.to_path_buf(),
                    offset,
                    source,
                })?;

            if let Some(update) = tracker.advance(offset, end) {
                sink.on_progress(update);
            }
            log::trace!("Overwrote bytes {}..{} of {}", offset, end, path.display());
            offset = end;
        }

        writer.flush().map_err(|source| ErasureError::Write {
            path: path.to_path_buf(),
            offset,
            source,
        })?;
        Ok(Pass::Complete)
    }

    /// Append the outcome to the operational log.
    fn record(&self, request: &ErasureRequest, outcome: &Outcome) {
        let path = request.path.display();
        match outcome {
            Outcome::Success => {
                let message = match request.strategy {
                    Strategy::StandardDelete => format!("Deleted file: {path}"),
                    Strategy::SecureOverwrite => {
                        format!("Securely overwritten and deleted file: {path}")
                    }
                };
                self.log.append(Level::Info, &message);
            }
            Outcome::Failure { kind, message } => {
                let headline = match kind {
                    ErrorKind::FileNotFound => "File not found",
                    ErrorKind::PermissionDenied => "Permission denied",
                    ErrorKind::ResourceBusy => "File in use or other OS error",
                    ErrorKind::UnknownOsError => "Unexpected error",
                };
                self.log.append(
                    Level::Error,
                    &format!("{headline}: {path} ({} failed: {message})", request.strategy),
                );
            }
            Outcome::Cancelled { overwritten } => {
                self.log.append(
                    Level::Warn,
                    &format!(
                        "Secure overwrite of {path} cancelled after {overwritten} byte(s); file left in place"
                    ),
                );
            }
        }
    }
}

/// Turns chunk boundaries into deduplicated progress samples.
#[derive(Debug)]
struct ProgressTracker {
    len: u64,
    last: Option<u8>,
}

impl ProgressTracker {
    fn new(len: u64) -> Self {
        Self { len, last: None }
    }

    /// Account for bytes `start..end` having been written.
    ///
    /// Returns the update for the last sample point in the range, if it is
    /// ahead of everything reported so far.
    fn advance(&mut self, start: u64, end: u64) -> Option<ProgressUpdate> {
        if end <= start {
            return None;
        }
        let sample = (end - 1) / PROGRESS_SAMPLE_INTERVAL * PROGRESS_SAMPLE_INTERVAL;
        if sample < start {
            return None;
        }
        let update = ProgressUpdate::at(sample, self.len)?;
        if self.last.is_some_and(|last| update.percent() <= last) {
            return None;
        }
        self.last = Some(update.percent());
        Some(update)
    }
}
