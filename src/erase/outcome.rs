//! Requests, progress updates, and terminal outcomes of an erasure.
//!
//! Every [`ErasureRequest`] handed to the engine produces exactly one
//! [`Outcome`]. Filesystem failures are classified into an [`ErrorKind`] so
//! callers can tell a missing file from a permission problem without parsing
//! messages.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a file is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Remove the directory entry without touching the content.
    StandardDelete,
    /// Overwrite every byte with random data, then remove the entry.
    SecureOverwrite,
}

impl Strategy {
    /// Human-readable label used in logs and prompts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::StandardDelete => "Standard Deletion",
            Self::SecureOverwrite => "Secure Overwrite",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single erasure operation: one path, one strategy.
///
/// Requests are consumed by [`DeletionEngine::execute`](super::DeletionEngine::execute);
/// retrying means building a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasureRequest {
    /// Target file.
    pub path: PathBuf,
    /// Selected strategy.
    pub strategy: Strategy,
}

impl ErasureRequest {
    /// Create a new request.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, strategy: Strategy) -> Self {
        Self {
            path: path.into(),
            strategy,
        }
    }

    /// Shorthand for a [`Strategy::StandardDelete`] request.
    #[must_use]
    pub fn standard(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Strategy::StandardDelete)
    }

    /// Shorthand for a [`Strategy::SecureOverwrite`] request.
    #[must_use]
    pub fn secure(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Strategy::SecureOverwrite)
    }
}

/// Completion percentage of an in-flight erasure, always in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgressUpdate {
    percent: u8,
}

impl ProgressUpdate {
    /// The terminal update emitted right before a successful outcome.
    pub const COMPLETE: Self = Self { percent: 100 };

    /// Create an update, clamping to 100.
    #[must_use]
    pub fn new(percent: u8) -> Self {
        Self {
            percent: percent.min(100),
        }
    }

    /// Percentage of index `index` within a file of `len` bytes, rounded down.
    ///
    /// Returns `None` for an empty file, where no sample is meaningful.
    #[must_use]
    pub fn at(index: u64, len: u64) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let percent = (u128::from(index) * 100 / u128::from(len)).min(100);
        Some(Self::new(percent as u8))
    }

    /// The percentage value.
    #[must_use]
    pub fn percent(self) -> u8 {
        self.percent
    }

    /// Whether this is the terminal 100% update.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self.percent == 100
    }
}

/// Failure taxonomy for erasure operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The target path does not exist (or vanished mid-operation).
    FileNotFound,
    /// The OS refused access to the target or its directory.
    PermissionDenied,
    /// The file is in use, or the OS rejected the operation for another reason.
    ResourceBusy,
    /// A failure the OS did not attach an error code to.
    UnknownOsError,
}

impl ErrorKind {
    /// Classify an I/O error.
    #[must_use]
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::ResourceBusy => Self::ResourceBusy,
            _ if err.raw_os_error().is_some() => Self::ResourceBusy,
            _ => Self::UnknownOsError,
        }
    }

    /// Short description shown to operators.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::FileNotFound => "file not found",
            Self::PermissionDenied => "permission denied",
            Self::ResourceBusy => "file in use or other OS error",
            Self::UnknownOsError => "unexpected error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Error raised by an individual erasure step.
///
/// These never escape the engine; they are folded into [`Outcome::Failure`].
#[derive(Debug, Error)]
pub enum ErasureError {
    /// Reading metadata failed.
    #[error("cannot stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opening the file for in-place writing failed.
    #[error("cannot open {path} for writing: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing random data failed at `offset`.
    #[error("overwrite of {path} failed at byte {offset}: {source}")]
    Write {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// Flushing overwritten data to storage failed.
    #[error("cannot flush {path}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing the directory entry failed.
    #[error("cannot remove {path}: {source}")]
    Unlink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The random source failed to produce bytes.
    #[error("random source unavailable while overwriting {path}: {message}")]
    Entropy { path: PathBuf, message: String },
}

impl ErasureError {
    /// The failure kind this error maps to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Metadata { source, .. }
            | Self::Open { source, .. }
            | Self::Write { source, .. }
            | Self::Sync { source, .. }
            | Self::Unlink { source, .. } => ErrorKind::classify(source),
            Self::Entropy { .. } => ErrorKind::UnknownOsError,
        }
    }

    /// Path the failing step operated on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Metadata { path, .. }
            | Self::Open { path, .. }
            | Self::Write { path, .. }
            | Self::Sync { path, .. }
            | Self::Unlink { path, .. }
            | Self::Entropy { path, .. } => path,
        }
    }
}

/// Terminal result of one erasure request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The file was erased and its directory entry removed.
    Success,
    /// The operation failed; the file is left in whatever state it reached.
    Failure { kind: ErrorKind, message: String },
    /// Cooperative cancellation stopped the overwrite after `overwritten`
    /// bytes. The file still exists with its original length.
    Cancelled { overwritten: u64 },
}

impl Outcome {
    /// Build a failure outcome.
    #[must_use]
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Whether the file was erased.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure kind, if this is a failure.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<ErasureError> for Outcome {
    fn from(err: ErasureError) -> Self {
        Self::failure(err.kind(), err.to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("File deleted successfully."),
            Self::Failure { kind, message } => write!(f, "{kind}: {message}"),
            Self::Cancelled { overwritten } => write!(
                f,
                "Cancelled after overwriting {overwritten} byte(s); file was not deleted."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_at_rounds_down() {
        assert_eq!(ProgressUpdate::at(0, 4).map(ProgressUpdate::percent), Some(0));
        assert_eq!(ProgressUpdate::at(1, 3).map(ProgressUpdate::percent), Some(33));
        assert_eq!(ProgressUpdate::at(199, 200).map(ProgressUpdate::percent), Some(99));
    }

    #[test]
    fn test_progress_at_empty_file() {
        assert_eq!(ProgressUpdate::at(0, 0), None);
    }

    #[test]
    fn test_progress_at_large_file_does_not_overflow() {
        let len = u64::MAX;
        let update = ProgressUpdate::at(len - 1, len).unwrap();
        assert_eq!(update.percent(), 99);
    }

    #[test]
    fn test_progress_new_clamps() {
        assert_eq!(ProgressUpdate::new(250).percent(), 100);
        assert!(ProgressUpdate::COMPLETE.is_complete());
    }

    #[test]
    fn test_classify_common_kinds() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(ErrorKind::classify(&err), ErrorKind::FileNotFound);

        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::classify(&err), ErrorKind::PermissionDenied);

        let err = io::Error::from(io::ErrorKind::ResourceBusy);
        assert_eq!(ErrorKind::classify(&err), ErrorKind::ResourceBusy);
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_os_error_is_busy() {
        // EISDIR
        let err = io::Error::from_raw_os_error(21);
        assert_eq!(ErrorKind::classify(&err), ErrorKind::ResourceBusy);
    }

    #[test]
    fn test_classify_synthetic_error_is_unknown() {
        let err = io::Error::new(io::ErrorKind::WriteZero, "short write");
        assert_eq!(ErrorKind::classify(&err), ErrorKind::UnknownOsError);
    }

    #[test]
    fn test_erasure_error_into_outcome() {
        let err = ErasureError::Unlink {
            path: PathBuf::from("/tmp/gone.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.path(), Path::new("/tmp/gone.txt"));

        let outcome = Outcome::from(err);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::FileNotFound));
        assert!(outcome.to_string().contains("/tmp/gone.txt"));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Success.to_string(), "File deleted successfully.");
        let cancelled = Outcome::Cancelled { overwritten: 2 };
        assert!(cancelled.to_string().contains("2 byte(s)"));
        assert!(!cancelled.is_success());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_string(&Outcome::failure(ErrorKind::ResourceBusy, "busy")).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("\"kind\":\"resource_busy\""));
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(Strategy::StandardDelete.to_string(), "Standard Deletion");
        assert_eq!(Strategy::SecureOverwrite.to_string(), "Secure Overwrite");
        let request = ErasureRequest::secure("a.bin");
        assert_eq!(request.strategy, Strategy::SecureOverwrite);
    }
}
