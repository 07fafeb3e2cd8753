//! Wipefinity - Secure File Deletion
//!
//! Destroys a single file either by unlinking it or by overwriting every byte
//! with cryptographically random data before unlinking. The deletion engine
//! lives in [`erase`]; the rest of the crate is the command-line caller and
//! its ambient plumbing.

pub mod app;
pub mod cli;
pub mod config;
pub mod erase;
pub mod error;
pub mod logging;
pub mod oplog;
pub mod progress;
pub mod signal;

pub use app::{build_request, run_app, RequestError};
