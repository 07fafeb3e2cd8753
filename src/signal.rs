//! Ctrl+C handling.
//!
//! Interrupting a secure overwrite must not leave a truncated file behind.
//! Instead of letting SIGINT kill the process mid-write, the handler only
//! sets a flag. That flag is the engine's cancellation flag, so the overwrite
//! stops at its next chunk boundary, syncs what it wrote, and reports
//! [`Outcome::Cancelled`](crate::erase::Outcome::Cancelled).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wipefinity::erase::DeletionEngine;
//! use wipefinity::oplog::FacadeLog;
//! use wipefinity::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let engine = DeletionEngine::new(Arc::new(FacadeLog)).with_cancel_flag(handler.get_flag());
//! ```
//!
//! # Exit Codes
//!
//! When Ctrl+C is pressed during an erasure:
//! - The interrupt flag is set to `true`
//! - A notice is printed to stderr
//! - The application exits with code 130 (128 + SIGINT)

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption.
/// Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared interrupt flag.
///
/// Wraps the `AtomicBool` that the Ctrl+C handler sets. Clones share the
/// same flag, and the flag itself is handed to the deletion engine.
///
/// # Thread Safety
///
/// `ShutdownHandler` is `Send` and `Sync`; the flag is only touched with
/// `SeqCst` atomic operations, so the signal thread, the worker and the
/// controlling thread all observe the same value.
///
/// # Example
///
/// ```rust
/// use wipefinity::signal::ShutdownHandler;
///
/// let handler = ShutdownHandler::new();
/// let flag = handler.get_flag();
///
/// handler.request_shutdown();
/// assert!(flag.load(std::sync::atomic::Ordering::SeqCst));
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    /// Set once an interrupt arrives.
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no interrupt requested.
    ///
    /// # Returns
    ///
    /// A new `ShutdownHandler` whose flag is `false`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an interrupt was received (or requested manually).
    ///
    /// # Returns
    ///
    /// `true` if Ctrl+C was pressed or `request_shutdown()` was called since
    /// the last reset.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the flag as if Ctrl+C had been pressed.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The underlying flag, for [`DeletionEngine::with_cancel_flag`](crate::erase::DeletionEngine::with_cancel_flag).
    ///
    /// # Returns
    ///
    /// An `Arc<AtomicBool>` shared with this handler; the engine checks it
    /// before every overwrite chunk.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    ///
    /// [`install_handler`] calls this so each run starts uninterrupted.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a Ctrl+C handler that sets the interrupt flag.
///
/// Safe to call more than once: later calls reset and return the handler
/// installed first. If another hook already owns SIGINT (e.g. in tests), an
/// unhooked handler is returned; it still works through
/// [`ShutdownHandler::request_shutdown`].
///
/// When Ctrl+C is pressed:
/// 1. The flag is set to `true`
/// 2. A notice is printed to stderr
/// 3. The running overwrite stops at its next chunk boundary
///
/// # Returns
///
/// The process-wide [`ShutdownHandler`], with its flag cleared.
///
/// # Errors
///
/// Currently always succeeds; the `Result` keeps room for platforms where
/// installation failure should be fatal.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Finishing current chunk; the file will not be deleted..."
        );
        let _ = std::io::stderr().flush();
        log::info!("Interrupt received, cancelling erasure");
    }) {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(_) => {
            if let Some(existing) = GLOBAL_HANDLER.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler already registered, using unhooked handler");
                let fallback = ShutdownHandler::new();
                let _ = GLOBAL_HANDLER.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_handler_new() {
        let handler = ShutdownHandler::new();
        assert!(!handler.is_shutdown_requested());
    }

    #[test]
    fn test_request_and_reset() {
        let handler = ShutdownHandler::default();
        handler.request_shutdown();
        assert!(handler.is_shutdown_requested());

        handler.reset();
        assert!(!handler.is_shutdown_requested());
    }

    #[test]
    fn test_flag_drives_engine_cancellation() {
        use crate::erase::DeletionEngine;
        use crate::oplog::NullLog;

        let handler = ShutdownHandler::new();
        let engine = DeletionEngine::new(Arc::new(NullLog)).with_cancel_flag(handler.get_flag());

        assert!(!engine.is_cancelled());
        handler.request_shutdown();
        assert!(engine.is_cancelled());
    }

    #[test]
    fn test_clone_shares_flag() {
        let handler = ShutdownHandler::new();
        let cloned = handler.clone();

        handler.request_shutdown();
        assert!(cloned.is_shutdown_requested());
    }

    #[test]
    fn test_install_handler_is_reentrant() {
        let first = install_handler().unwrap();
        let second = install_handler().unwrap();
        first.request_shutdown();
        assert!(second.is_shutdown_requested());
        second.reset();
    }

    #[test]
    fn test_exit_code_interrupted() {
        assert_eq!(EXIT_CODE_INTERRUPTED, 130);
    }

    #[test]
    fn test_shutdown_handler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShutdownHandler>();
    }
}
