//! Terminal progress display using indicatif.
//!
//! [`Progress`] implements [`ProgressSink`] so the CLI can hand it straight
//! to the engine (or drive it from worker events).
//!
//! # Accessible Mode
//!
//! When accessible mode is enabled, progress reporting uses simplified output:
//! - ASCII bar characters, no Unicode blocks
//! - No colors
//!
//! # Example
//!
//! ```rust,no_run
//! use wipefinity::erase::{ProgressSink, ProgressUpdate};
//! use wipefinity::progress::Progress;
//!
//! let progress = Progress::new(false);
//! progress.start("/tmp/secret.txt", "Secure Overwrite");
//! progress.on_progress(ProgressUpdate::new(42));
//! ```

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::erase::{Outcome, ProgressSink, ProgressUpdate};

/// Progress bar for a single erasure.
///
/// The bar spans 0..=100 and is drawn on stderr, so stdout stays free for
/// the final report. Nothing is drawn until [`Progress::start`].
///
/// # Thread Safety
///
/// The bar sits behind a `Mutex`, which makes `Progress` `Send + Sync` as
/// [`ProgressSink`] requires. It may be driven directly from the worker
/// thread or from events on the controlling thread.
pub struct Progress {
    /// Active bar, taken when the outcome arrives.
    bar: Mutex<Option<ProgressBar>>,
    /// Draw nothing.
    quiet: bool,
    /// ASCII-only, uncolored style.
    accessible: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use wipefinity::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self::with_accessible(quiet, false)
    }

    /// Create a new progress reporter with accessible mode.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    /// * `accessible` - If true, use ASCII characters and no colors.
    ///
    /// # Returns
    ///
    /// A reporter with no bar yet; call [`Progress::start`] to show one.
    #[must_use]
    pub fn with_accessible(quiet: bool, accessible: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
            accessible,
        }
    }

    /// Check if accessible mode is enabled.
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Show the bar for an erasure of `file_name`.
    ///
    /// `label` is the strategy name shown as the bar prefix. Long paths are
    /// shortened to their file name. Does nothing in quiet mode.
    pub fn start(&self, file_name: &str, label: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
        pb.set_style(self.style());
        pb.set_prefix(label.to_string());
        pb.set_message(truncate_path(file_name, 30));
        *self.lock() = Some(pb);
    }

    fn style(&self) -> ProgressStyle {
        if self.accessible {
            ProgressStyle::with_template("{prefix} [{bar:40}] {pos}% {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-")
        } else {
            ProgressStyle::with_template(
                "{prefix:.bold} [{bar:40.red/blue}] {pos:>3}% {msg} [{elapsed_precise}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        match self.bar.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Moves the bar on progress; finishes it on success, abandons it otherwise.
impl ProgressSink for Progress {
    fn on_progress(&self, update: ProgressUpdate) {
        if let Some(ref pb) = *self.lock() {
            pb.set_position(u64::from(update.percent()));
        }
    }

    fn on_outcome(&self, outcome: &Outcome) {
        if let Some(pb) = self.lock().take() {
            match outcome {
                Outcome::Success => pb.finish_with_message("done"),
                Outcome::Failure { kind, .. } => pb.abandon_with_message(kind.to_string()),
                Outcome::Cancelled { .. } => pb.abandon_with_message("cancelled"),
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let count = file_name.chars().count();
    if count >= max_len {
        let tail: String = file_name.chars().skip(count - (max_len - 3)).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
