#![forbid(unsafe_code)]

//! Index-based identity diff between two snapshots.
//!
//! # Algorithm
//!
//! 1. Every old key missing from `new` becomes a `Remove` at its old index,
//!    emitted in descending index order.
//! 2. Keys present in both snapshots ("survivors") are ranked by their old
//!    relative order. Reading those ranks in new order, a longest increasing
//!    subsequence marks the survivors that can stay put; every other survivor
//!    is moved, in ascending new order, to sit directly after its new
//!    predecessor.
//! 3. Every new key missing from `old` becomes an `Insert` at its new index,
//!    emitted in ascending index order.
//! 4. Survivors whose content changed get one `Update`, whether or not they
//!    also moved. A content change never turns into a remove/insert pair.
//!
//! # Invariants
//!
//! 1. **Correct**: applying the result in order to a collection mirroring
//!    `old` yields exactly `new`.
//! 2. **Idempotent**: `diff(s, s)` is empty for every snapshot `s`.
//! 3. **Deterministic**: output depends only on the two snapshots. Hash maps
//!    are used for lookups only, never iterated.
//! 4. **Minimal moves**: the number of `Move`s is `survivors - LIS`.
//!
//! # Complexity
//!
//! `O(n log n)` for classification and the subsequence, plus `O(s × m)` to
//! place `m` moved items among `s` survivors.

use crate::identity::ListItem;
use crate::operation::{Operation, OperationList};
use crate::snapshot::Snapshot;

/// Compute the operations that turn `old` into `new`.
///
/// ```
/// use slist_core::{diff, Snapshot};
///
/// let old = Snapshot::new(vec!['a', 'b', 'c'])?;
/// let new = Snapshot::new(vec!['c', 'a', 'd'])?;
/// let ops = diff(&old, &new);
///
/// let mut rows = old.items().to_vec();
/// ops.apply_to(&mut rows).unwrap();
/// assert_eq!(rows, new.items());
/// # Ok::<(), slist_core::SnapshotError>(())
/// ```
#[must_use]
pub fn diff<T: ListItem>(old: &Snapshot<T>, new: &Snapshot<T>) -> OperationList<T> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("list_diff", old = old.len(), new = new.len()).entered();

    if old.ptr_eq(new) {
        return OperationList::default();
    }

    // Survivor rank by old index; `None` for removed items.
    let mut old_rank: Vec<Option<usize>> = vec![None; old.len()];
    let mut survivor_keys = Vec::new();
    let mut removes = Vec::new();
    for (index, item) in old.iter().enumerate() {
        let key = item.key();
        if new.contains_key(&key) {
            old_rank[index] = Some(survivor_keys.len());
            survivor_keys.push(key);
        } else {
            removes.push(Operation::Remove { key, index });
        }
    }
    removes.reverse();

    let mut inserts = Vec::new();
    let mut updates = Vec::new();
    let mut target_ranks = Vec::with_capacity(survivor_keys.len());
    for (index, item) in new.iter().enumerate() {
        let key = item.key();
        match old.index_of(&key) {
            None => inserts.push(Operation::Insert {
                item: item.clone(),
                index,
            }),
            Some(old_index) => {
                if let Some(rank) = old_rank[old_index] {
                    target_ranks.push(rank);
                }
                let previous = &old.items()[old_index];
                if !previous.content_eq(item) {
                    updates.push(Operation::Update {
                        key,
                        item: item.clone(),
                        index,
                    });
                }
            }
        }
    }

    let moves = plan_moves(&survivor_keys, &target_ranks);
    let ops = OperationList::from_phases(removes, moves, inserts, updates);

    #[cfg(feature = "tracing")]
    tracing::debug!(counts = %ops.counts(), "list diff computed");

    ops
}

/// Moves that reorder survivors from old relative order (`0..n`) into the
/// order given by `target_ranks`.
fn plan_moves<T: ListItem>(survivor_keys: &[T::Key], target_ranks: &[usize]) -> Vec<Operation<T>> {
    let stable = stable_positions(target_ranks);
    let mut working: Vec<usize> = (0..target_ranks.len()).collect();
    let mut moves = Vec::new();

    for (j, &rank) in target_ranks.iter().enumerate() {
        if stable[j] {
            continue;
        }
        let Some(from) = working.iter().position(|&r| r == rank) else {
            continue;
        };
        working.remove(from);
        let to = match j.checked_sub(1) {
            None => 0,
            Some(p) => {
                let predecessor = target_ranks[p];
                working
                    .iter()
                    .position(|&r| r == predecessor)
                    .map_or(0, |at| at + 1)
            }
        };
        working.insert(to, rank);
        if from != to {
            moves.push(Operation::Move {
                key: survivor_keys[rank].clone(),
                from,
                to,
            });
        }
    }
    moves
}

/// Flags the members of one longest strictly increasing subsequence.
///
/// Patience sorting with predecessor links; ties resolve the same way on
/// every run.
fn stable_positions(seq: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = prev[i];
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: char,
        content: u32,
    }

    impl ListItem for Item {
        type Key = char;

        fn key(&self) -> char {
            self.id
        }
    }

    fn snap(ids: &str) -> Snapshot<Item> {
        Snapshot::new(ids.chars().map(|id| Item { id, content: 0 })).unwrap()
    }

    fn apply(old: &Snapshot<Item>, new: &Snapshot<Item>) -> Vec<Item> {
        let mut rows = old.items().to_vec();
        diff(old, new).apply_to(&mut rows).unwrap();
        rows
    }

    #[test]
    fn identical_snapshots_produce_no_ops() {
        let a = snap("abcde");
        assert!(diff(&a, &a).is_empty());
        assert!(diff(&a, &snap("abcde")).is_empty());
    }

    #[test]
    fn empty_to_items_is_all_inserts_ascending() {
        let ops = diff(&snap(""), &snap("xy"));
        let indices: Vec<_> = ops
            .iter()
            .map(|op| match op {
                Operation::Insert { index, .. } => *index,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn items_to_empty_is_all_removes_descending() {
        let ops = diff(&snap("abc"), &snap(""));
        let indices: Vec<_> = ops
            .iter()
            .map(|op| match op {
                Operation::Remove { index, .. } => *index,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![2, 1, 0]);
    }

    #[test]
    fn remove_move_insert_scenario() {
        let old = snap("abc");
        let new = snap("cad");
        let ops = diff(&old, &new);
        assert_eq!(
            ops.ops(),
            &[
                Operation::Remove { key: 'b', index: 1 },
                Operation::Move { key: 'c', from: 1, to: 0 },
                Operation::Insert {
                    item: Item { id: 'd', content: 0 },
                    index: 2,
                },
            ]
        );
        assert_eq!(apply(&old, &new), new.items());
    }

    #[test]
    fn content_change_in_place_is_a_single_update() {
        let old = Snapshot::new(vec![Item { id: 'a', content: 1 }]).unwrap();
        let new = Snapshot::new(vec![Item { id: 'a', content: 2 }]).unwrap();
        let ops = diff(&old, &new);
        assert_eq!(
            ops.ops(),
            &[Operation::Update {
                key: 'a',
                item: Item { id: 'a', content: 2 },
                index: 0,
            }]
        );
    }

    #[test]
    fn moved_and_changed_is_one_move_plus_one_update() {
        let old = Snapshot::new(vec![
            Item { id: 'a', content: 1 },
            Item { id: 'b', content: 1 },
        ])
        .unwrap();
        let new = Snapshot::new(vec![
            Item { id: 'b', content: 1 },
            Item { id: 'a', content: 9 },
        ])
        .unwrap();
        let ops = diff(&old, &new);
        let counts = ops.counts();
        assert_eq!((counts.removes, counts.inserts), (0, 0));
        assert_eq!(counts.moves, 1);
        assert_eq!(counts.updates, 1);
        assert_eq!(apply(&old, &new), new.items());
    }

    #[test]
    fn rotation_moves_a_single_item() {
        let old = snap("abcd");
        let new = snap("bcda");
        let ops = diff(&old, &new);
        assert_eq!(ops.ops(), &[Operation::Move { key: 'a', from: 0, to: 3 }]);
        assert_eq!(apply(&old, &new), new.items());
    }

    #[test]
    fn reversal_keeps_one_item_fixed() {
        let old = snap("abcdef");
        let new = snap("fedcba");
        let ops = diff(&old, &new);
        assert_eq!(ops.counts().moves, 5);
        assert_eq!(apply(&old, &new), new.items());
    }

    #[test]
    fn mixed_churn_round_trips() {
        for (a, b) in [
            ("abcdefg", "gxfyedz"),
            ("abc", "xyz"),
            ("a", "ba"),
            ("abcde", "aebdc"),
            ("", ""),
        ] {
            let (old, new) = (snap(a), snap(b));
            assert_eq!(apply(&old, &new), new.items(), "{a} -> {b}");
        }
    }

    #[test]
    fn stable_positions_marks_longest_run() {
        assert_eq!(stable_positions(&[]), Vec::<bool>::new());
        assert_eq!(stable_positions(&[0, 1, 2]), vec![true, true, true]);
        assert_eq!(stable_positions(&[1, 2, 3, 0]), vec![true, true, true, false]);
        let keep = stable_positions(&[3, 0, 1, 2]);
        assert_eq!(keep.iter().filter(|k| **k).count(), 3);
        assert!(!keep[0]);
    }
}
