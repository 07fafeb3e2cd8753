//! File erasure.
//!
//! This module provides:
//! - [`DeletionEngine`]: standard deletion and secure overwrite of one file
//! - [`ProgressSink`]: the callback contract for progress and outcome events
//! - [`worker`]: running an erasure on a dedicated thread
//!
//! # Outcomes
//!
//! Every request produces exactly one [`Outcome`], delivered last. Failures
//! carry an [`ErrorKind`]: `FileNotFound`, `PermissionDenied`,
//! `ResourceBusy` or `UnknownOsError`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wipefinity::erase::{DeletionEngine, ErasureRequest, FnSink};
//! use wipefinity::oplog::FileLog;
//!
//! let log = Arc::new(FileLog::open("wipefinity.log").unwrap());
//! let engine = DeletionEngine::new(log);
//! let sink = FnSink::new(|u| println!("{}%", u.percent()), |o| println!("{o}"));
//! engine.execute(ErasureRequest::standard("old.txt"), &sink);
//! ```

pub mod engine;
pub mod outcome;
pub mod sink;
pub mod worker;

// Re-export commonly used types
pub use engine::{DeletionEngine, EngineConfig, DEFAULT_CHUNK_SIZE, PROGRESS_SAMPLE_INTERVAL};
pub use outcome::{ErasureError, ErasureRequest, ErrorKind, Outcome, ProgressUpdate, Strategy};
pub use sink::{ChannelSink, ErasureEvent, FnSink, NullSink, ProgressSink};
pub use worker::{spawn, ErasureHandle};
