//! Running an erasure off the controlling thread.
//!
//! [`spawn`] moves a request onto a dedicated worker thread and hands back an
//! [`ErasureHandle`]. Events arrive on a channel so the controlling thread
//! (a UI loop, a CLI progress bar) consumes them in its own context.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wipefinity::erase::{worker, DeletionEngine, ErasureEvent, ErasureRequest};
//! use wipefinity::oplog::FacadeLog;
//!
//! let engine = Arc::new(DeletionEngine::new(Arc::new(FacadeLog)));
//! let handle = worker::spawn(engine, ErasureRequest::secure("big.iso")).unwrap();
//! let outcome = handle.wait_with(|event| {
//!     if let ErasureEvent::Progress(update) = event {
//!         println!("{}%", update.percent());
//!     }
//! });
//! println!("{outcome}");
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::engine::DeletionEngine;
use super::outcome::{ErasureRequest, ErrorKind, Outcome};
use super::sink::{ChannelSink, ErasureEvent};

/// Name given to worker threads.
pub const WORKER_THREAD_NAME: &str = "wipefinity-erase";

/// Handle to an erasure running on a worker thread.
#[derive(Debug)]
pub struct ErasureHandle {
    events: Receiver<ErasureEvent>,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<Outcome>,
}

/// Start `request` on a new worker thread.
///
/// Each handle carries its own cancellation token, so cancelling one
/// erasure leaves the engine free for the next. The engine-wide flag
/// (Ctrl+C) still stops the worker too.
///
/// # Errors
///
/// Returns the I/O error if the OS refuses to create the thread. Nothing has
/// touched the filesystem in that case.
pub fn spawn(engine: Arc<DeletionEngine>, request: ErasureRequest) -> io::Result<ErasureHandle> {
    let (sink, events) = ChannelSink::new();
    let cancel = Arc::new(AtomicBool::new(false));
    let token = Arc::clone(&cancel);

    let thread = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || engine.execute_cancellable(request, &sink, &token))?;

    Ok(ErasureHandle {
        events,
        cancel,
        thread,
    })
}

impl ErasureHandle {
    /// Receiver for progress and outcome events.
    ///
    /// The stream ends with exactly one [`ErasureEvent::Finished`].
    #[must_use]
    pub fn events(&self) -> &Receiver<ErasureEvent> {
        &self.events
    }

    /// Ask the worker to stop at its next chunk boundary.
    ///
    /// Only this erasure is affected.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Whether the worker has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its outcome.
    ///
    /// Undrained events are discarded.
    #[must_use]
    pub fn join(self) -> Outcome {
        match self.thread.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                log::error!("Erasure worker panicked");
                Outcome::failure(ErrorKind::UnknownOsError, "erasure worker panicked")
            }
        }
    }

    /// Feed every event to `on_event` on the calling thread, then join.
    pub fn wait_with<F>(self, mut on_event: F) -> Outcome
    where
        F: FnMut(&ErasureEvent),
    {
        for event in self.events.iter() {
            on_event(&event);
            if event.is_terminal() {
                break;
            }
        }
        self.join()
    }
}
