use std::fs;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tempfile::TempDir;
use wipefinity::erase::{
    DeletionEngine, EngineConfig, ErasureRequest, Outcome, ProgressSink, ProgressUpdate,
};
use wipefinity::oplog::NullLog;

#[derive(Default)]
struct Percents(Mutex<Vec<u8>>);

impl ProgressSink for Percents {
    fn on_progress(&self, update: ProgressUpdate) {
        self.0.lock().unwrap().push(update.percent());
    }

    fn on_outcome(&self, _outcome: &Outcome) {}
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_secure_overwrite_always_completes(
        content in prop::collection::vec(any::<u8>(), 0..20_000),
        chunk_size in 1usize..5_000,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("target.bin");
        fs::write(&path, &content).unwrap();

        let sink = Percents::default();
        let engine = DeletionEngine::new(Arc::new(NullLog))
            .with_config(EngineConfig::default().with_chunk_size(chunk_size));
        let outcome = engine.execute(ErasureRequest::secure(&path), &sink);

        prop_assert_eq!(outcome, Outcome::Success);
        prop_assert!(!path.exists());

        let percents = sink.0.lock().unwrap().clone();
        prop_assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(percents.last().copied(), Some(100));
        prop_assert!(percents[..percents.len() - 1].iter().all(|&p| p < 100));
        if content.is_empty() {
            prop_assert_eq!(percents, vec![100]);
        }
    }

    #[test]
    fn test_interrupt_preserves_length_and_suffix(
        content in prop::collection::vec(any::<u8>(), 1..5_000),
        cut in any::<prop::sample::Index>(),
        chunk_size in 1usize..1_000,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("target.bin");
        fs::write(&path, &content).unwrap();

        let stop = cut.index(content.len()) as u64;
        let engine = DeletionEngine::new(Arc::new(NullLog)).with_config(
            EngineConfig::default()
                .with_chunk_size(chunk_size)
                .interrupt_after(stop),
        );
        let outcome = engine.execute(ErasureRequest::secure(&path), &Percents::default());

        prop_assert_eq!(outcome, Outcome::Cancelled { overwritten: stop });
        let after = fs::read(&path).unwrap();
        prop_assert_eq!(after.len(), content.len());
        prop_assert_eq!(&after[stop as usize..], &content[stop as usize..]);
    }

    #[test]
    fn test_progress_at_is_bounded(index in any::<u64>(), len in 1u64..) {
        let index = index % len;
        let update = ProgressUpdate::at(index, len).unwrap();
        prop_assert!(update.percent() < 100);
    }
}
