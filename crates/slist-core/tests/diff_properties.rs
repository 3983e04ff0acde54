#![forbid(unsafe_code)]

//! Property tests for the list diff engine.
//!
//! # Invariants
//!
//! 1. **Correctness**: applying `diff(old, new)` to `old` yields `new`.
//! 2. **Idempotence**: `diff(s, s)` is empty.
//! 3. **Phase order**: removes, then moves, then inserts, then updates.
//! 4. **Removes descend, inserts ascend.**
//! 5. **Moves are minimal**: never more than `survivors - 1`, and zero when
//!    survivor order is preserved.
//!
//! Run: `cargo test -p slist-core --test diff_properties`

use proptest::prelude::*;
use slist_core::{ListItem, Operation, Snapshot, diff};

#[derive(Clone, Debug, PartialEq)]
struct Cell {
    id: u16,
    rev: u8,
}

impl ListItem for Cell {
    type Key = u16;

    fn key(&self) -> u16 {
        self.id
    }
}

/// A duplicate-free sequence drawn from a small id universe so that old and
/// new snapshots overlap heavily.
fn arb_snapshot() -> impl Strategy<Value = Snapshot<Cell>> {
    prop::collection::vec((0u16..48, 0u8..3), 0..40).prop_map(|raw| {
        let mut seen = std::collections::HashSet::new();
        let cells: Vec<Cell> = raw
            .into_iter()
            .filter(|(id, _)| seen.insert(*id))
            .map(|(id, rev)| Cell { id, rev })
            .collect();
        Snapshot::new(cells).expect("ids deduplicated above")
    })
}

fn phase(op: &Operation<Cell>) -> u8 {
    match op {
        Operation::Remove { .. } => 0,
        Operation::Move { .. } => 1,
        Operation::Insert { .. } => 2,
        Operation::Update { .. } => 3,
    }
}

proptest! {
    #[test]
    fn prop_apply_yields_new(old in arb_snapshot(), new in arb_snapshot()) {
        let ops = diff(&old, &new);
        let mut rows = old.items().to_vec();
        prop_assert!(ops.apply_to(&mut rows).is_ok());
        prop_assert_eq!(rows.as_slice(), new.items());
    }

    #[test]
    fn prop_self_diff_is_empty(snap in arb_snapshot()) {
        prop_assert!(diff(&snap, &snap).is_empty());
        let rebuilt = Snapshot::new(snap.items().to_vec()).unwrap();
        prop_assert!(diff(&snap, &rebuilt).is_empty());
    }

    #[test]
    fn prop_phases_are_ordered(old in arb_snapshot(), new in arb_snapshot()) {
        let ops = diff(&old, &new);
        let phases: Vec<u8> = ops.iter().map(phase).collect();
        prop_assert!(phases.windows(2).all(|w| w[0] <= w[1]));

        let removes: Vec<usize> = ops.iter().filter_map(|op| match op {
            Operation::Remove { index, .. } => Some(*index),
            _ => None,
        }).collect();
        prop_assert!(removes.windows(2).all(|w| w[0] > w[1]));

        let inserts: Vec<usize> = ops.iter().filter_map(|op| match op {
            Operation::Insert { index, .. } => Some(*index),
            _ => None,
        }).collect();
        prop_assert!(inserts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_moves_bounded_by_survivors(old in arb_snapshot(), new in arb_snapshot()) {
        let survivors = old.iter().filter(|c| new.contains_key(&c.id)).count();
        let moves = diff(&old, &new).counts().moves;
        prop_assert!(moves <= survivors.saturating_sub(1));
    }

    #[test]
    fn prop_each_key_touched_by_at_most_one_structural_op(
        old in arb_snapshot(),
        new in arb_snapshot(),
    ) {
        let ops = diff(&old, &new);
        let mut seen = std::collections::HashSet::new();
        for op in ops.iter().filter(|op| phase(op) < 3) {
            prop_assert!(seen.insert(op.key()), "key {} touched twice", op.key());
        }
    }
}

#[test]
fn appending_keeps_survivors_in_place() {
    let old = Snapshot::new((0u16..10).map(|id| Cell { id, rev: 0 })).unwrap();
    let new = Snapshot::new((0u16..12).map(|id| Cell { id, rev: 0 })).unwrap();
    let ops = diff(&old, &new);
    assert_eq!(ops.counts().moves, 0);
    assert_eq!(ops.counts().inserts, 2);
}
