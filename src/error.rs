//! Exit codes and structured error reporting for the CLI.

use serde::Serialize;

use crate::erase::{ErrorKind, Outcome};

/// Exit codes for the Wipefinity application.
///
/// - 0: Success (file erased, or the user declined at the prompt)
/// - 1: General error (invalid input, configuration, unexpected failure)
/// - 2: Erasure failed (the engine reported a failure outcome)
/// - 3: Cancelled (overwrite stopped early; file still present)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The file was erased.
    Success = 0,
    /// An unexpected error occurred before or around the erasure.
    GeneralError = 1,
    /// The erasure itself failed.
    ErasureFailed = 2,
    /// The overwrite was cancelled programmatically.
    Cancelled = 3,
    /// Interrupted by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "WF000",
            Self::GeneralError => "WF001",
            Self::ErasureFailed => "WF002",
            Self::Cancelled => "WF003",
            Self::Interrupted => "WF130",
        }
    }

    /// Exit code for an engine outcome. `interrupted` is whether Ctrl+C was seen.
    #[must_use]
    pub fn from_outcome(outcome: &Outcome, interrupted: bool) -> Self {
        match outcome {
            Outcome::Success => Self::Success,
            Outcome::Failure { .. } => Self::ErasureFailed,
            Outcome::Cancelled { .. } if interrupted => Self::Interrupted,
            Outcome::Cancelled { .. } => Self::Cancelled,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "WF002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Failure kind, when the engine reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            kind: None,
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }

    /// Create a structured error from a non-success outcome.
    #[must_use]
    pub fn from_outcome(outcome: &Outcome, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            kind: outcome.error_kind(),
            message: outcome.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
