#![no_main]

//! Reconciler convergence under arbitrary publish/complete interleavings.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use slist_core::Snapshot;
use slist_runtime::{CompletionMode, ModelCollection, Reconciler, ReconcilerConfig};

#[derive(Debug, Arbitrary)]
enum Action {
    Publish(Vec<u8>),
    Finish,
    Drop,
}

fuzz_target!(|actions: Vec<Action>| {
    let rec = Reconciler::new(
        ModelCollection::<u8>::new(CompletionMode::Deferred),
        ReconcilerConfig::default(),
    );
    let mut last: Option<Vec<u8>> = None;

    for action in actions {
        match action {
            Action::Publish(mut ids) => {
                let mut seen = [false; 256];
                ids.retain(|&id| !std::mem::replace(&mut seen[id as usize], true));
                if let Ok(snapshot) = Snapshot::new(ids.clone()) {
                    rec.apply(snapshot);
                    last = Some(ids);
                }
            }
            Action::Finish => {
                rec.with_collection(ModelCollection::finish_pending);
            }
            Action::Drop => {
                // Abandoned completion fails the session and drops the queue.
                drop(rec.with_collection(ModelCollection::take_pending));
                last = None;
            }
        }
    }
    while rec.with_collection(ModelCollection::finish_pending) == Some(true) {}

    assert!(!rec.is_busy());
    let shown = rec.with_collection(|host| host.items().to_vec()).unwrap_or_default();
    assert_eq!(rec.last_applied().items(), shown.as_slice());
    if let Some(last) = last {
        assert_eq!(shown, last);
    }
});
