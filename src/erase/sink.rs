//! Receivers for progress and outcome events.
//!
//! The engine only needs something it can call from the thread it runs on.
//! Callers that want events on a different thread use [`ChannelSink`] and
//! drain the receiving end wherever they like.

use std::sync::mpsc::{self, Receiver, Sender};

use super::outcome::{Outcome, ProgressUpdate};

/// Callback interface for an erasure in progress.
///
/// For one request the engine calls [`on_progress`](Self::on_progress) with
/// non-decreasing percentages, then [`on_outcome`](Self::on_outcome) exactly
/// once. Nothing follows the outcome.
pub trait ProgressSink: Send + Sync {
    /// Called when the completion percentage advances.
    fn on_progress(&self, update: ProgressUpdate);

    /// Called once with the terminal result.
    fn on_outcome(&self, outcome: &Outcome);
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _update: ProgressUpdate) {}
    fn on_outcome(&self, _outcome: &Outcome) {}
}

/// An event delivered through a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErasureEvent {
    /// Progress advanced.
    Progress(ProgressUpdate),
    /// Terminal result; no events follow.
    Finished(Outcome),
}

impl ErasureEvent {
    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Sink that forwards events over an mpsc channel.
///
/// Send failures are ignored: a dropped receiver means nobody is listening,
/// which must not abort the erasure.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ErasureEvent>,
}

impl ChannelSink {
    /// Create a sink together with the receiver for its events.
    #[must_use]
    pub fn new() -> (Self, Receiver<ErasureEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, update: ProgressUpdate) {
        let _ = self.tx.send(ErasureEvent::Progress(update));
    }

    fn on_outcome(&self, outcome: &Outcome) {
        let _ = self.tx.send(ErasureEvent::Finished(outcome.clone()));
    }
}

/// Sink built from a pair of closures.
///
/// ```
/// use wipefinity::erase::FnSink;
///
/// let sink = FnSink::new(
///     |update| println!("{}%", update.percent()),
///     |outcome| println!("{outcome}"),
/// );
/// # let _ = sink;
/// ```
pub struct FnSink<P, O> {
    progress: P,
    outcome: O,
}

impl<P, O> FnSink<P, O>
where
    P: Fn(ProgressUpdate) + Send + Sync,
    O: Fn(&Outcome) + Send + Sync,
{
    /// Wrap the two callbacks.
    pub fn new(progress: P, outcome: O) -> Self {
        Self { progress, outcome }
    }
}

impl<P, O> ProgressSink for FnSink<P, O>
where
    P: Fn(ProgressUpdate) + Send + Sync,
    O: Fn(&Outcome) + Send + Sync,
{
    fn on_progress(&self, update: ProgressUpdate) {
        (self.progress)(update);
    }

    fn on_outcome(&self, outcome: &Outcome) {
        (self.outcome)(outcome);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &S {
    fn on_progress(&self, update: ProgressUpdate) {
        (**self).on_progress(update);
    }

    fn on_outcome(&self, outcome: &Outcome) {
        (**self).on_outcome(outcome);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn on_progress(&self, update: ProgressUpdate) {
        (**self).on_progress(update);
    }

    fn on_outcome(&self, outcome: &Outcome) {
        (**self).on_outcome(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (sink, rx) = ChannelSink::new();
        sink.on_progress(ProgressUpdate::new(10));
        sink.on_progress(ProgressUpdate::COMPLETE);
        sink.on_outcome(&Outcome::Success);
        drop(sink);

        let events: Vec<ErasureEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                ErasureEvent::Progress(ProgressUpdate::new(10)),
                ErasureEvent::Progress(ProgressUpdate::COMPLETE),
                ErasureEvent::Finished(Outcome::Success),
            ]
        );
        assert!(events.last().unwrap().is_terminal());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_progress(ProgressUpdate::new(50));
        sink.on_outcome(&Outcome::Success);
    }

    #[test]
    fn test_fn_sink_invokes_closures() {
        let progress = AtomicUsize::new(0);
        let outcomes = AtomicUsize::new(0);
        let sink = FnSink::new(
            |_| {
                progress.fetch_add(1, Ordering::SeqCst);
            },
            |_| {
                outcomes.fetch_add(1, Ordering::SeqCst);
            },
        );

        sink.on_progress(ProgressUpdate::new(1));
        sink.on_progress(ProgressUpdate::new(2));
        sink.on_outcome(&Outcome::Success);

        assert_eq!(progress.load(Ordering::SeqCst), 2);
        assert_eq!(outcomes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sink_is_object_safe() {
        let boxed: Box<dyn ProgressSink> = Box::new(NullSink);
        boxed.on_progress(ProgressUpdate::new(0));
        boxed.on_outcome(&Outcome::Success);
    }
}
