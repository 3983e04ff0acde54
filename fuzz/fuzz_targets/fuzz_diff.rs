#![no_main]

//! Diff correctness on arbitrary snapshot pairs.
//!
//! Items are `(id, content)` pairs; duplicate ids are dropped so every input
//! builds a valid snapshot.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use slist_core::{ListItem, Operation, Snapshot, diff};

#[derive(Debug, Clone, PartialEq, Arbitrary)]
struct Item {
    id: u8,
    content: u8,
}

impl ListItem for Item {
    type Key = u8;

    fn key(&self) -> u8 {
        self.id
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    old: Vec<Item>,
    new: Vec<Item>,
}

fn dedup(items: Vec<Item>) -> Vec<Item> {
    let mut seen = [false; 256];
    items
        .into_iter()
        .filter(|item| !std::mem::replace(&mut seen[item.id as usize], true))
        .collect()
}

fuzz_target!(|input: Input| {
    let old = dedup(input.old);
    let new = dedup(input.new);
    let (Ok(old_snap), Ok(new_snap)) = (Snapshot::new(old.clone()), Snapshot::new(new.clone()))
    else {
        panic!("deduplicated input must build");
    };

    let ops = diff(&old_snap, &new_snap);
    let mut shown = old.clone();
    ops.apply_to(&mut shown).expect("diff output applies cleanly");
    assert_eq!(shown, new);

    // Phases in order: removes, moves, inserts, updates.
    let phase = |op: &Operation<Item>| match op {
        Operation::Remove { .. } => 0,
        Operation::Move { .. } => 1,
        Operation::Insert { .. } => 2,
        Operation::Update { .. } => 3,
    };
    assert!(ops.iter().map(phase).is_sorted());

    assert!(diff(&new_snap, &new_snap).is_empty());
    assert_eq!(diff(&old_snap, &new_snap), ops);
});
