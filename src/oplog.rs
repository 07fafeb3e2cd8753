//! Operational log: an append-only record of erasure outcomes.
//!
//! Diagnostics go through the `log` facade (see [`crate::logging`]). The
//! operational log is separate: it is the durable audit trail of what was
//! erased and what failed, written to a fixed file for the lifetime of the
//! process. It is handed to the engine explicitly instead of living in a
//! global.
//!
//! Entries look like:
//!
//! ```text
//! 2026-10-16 14:03:11,482 - INFO - Securely overwritten and deleted file: /tmp/secret.txt
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use log::Level;

/// Default file name of the operational log.
pub const DEFAULT_LOG_FILE: &str = "wipefinity.log";

/// Sink for operational log entries.
pub trait OperationLog: Send + Sync {
    /// Append one entry. Must not fail the caller.
    fn append(&self, level: Level, message: &str);
}

/// Append-only file log.
///
/// The file is opened once in append mode; it is never truncated or rotated.
/// Every entry is mirrored to the `log` facade so `-v` shows it on stderr too.
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLog {
    /// Open (or create) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened for appending.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("Operational log opened at {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OperationLog for FileLog {
    fn append(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);

        let line = format_entry(level, message);
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let written = file.write_all(line.as_bytes());
        if let Err(e) = written.and_then(|()| file.flush()) {
            log::warn!(
                "Failed to write operational log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Forwards entries to the `log` facade only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLog;

impl OperationLog for FacadeLog {
    fn append(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

/// Discards every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl OperationLog for NullLog {
    fn append(&self, _level: Level, _message: &str) {}
}

/// Format one log line, including the trailing newline.
fn format_entry(level: Level, message: &str) -> String {
    format!(
        "{} - {} - {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
        level,
        message
    )
}
