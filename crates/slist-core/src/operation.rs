#![forbid(unsafe_code)]

//! List operations and their sequential application.
//!
//! An [`OperationList`] is ordered so that applying it front to back against
//! an index-addressed collection that currently mirrors the old snapshot
//! leaves the collection mirroring the new snapshot.
//!
//! # Ordering
//!
//! | Phase | Operation | Index meaning |
//! |-------|-----------|---------------|
//! | 1 | `Remove` (descending old index) | position in the old sequence |
//! | 2 | `Move` | positions among surviving items, at the moment of the move |
//! | 3 | `Insert` (ascending new index) | final position in the new sequence |
//! | 4 | `Update` | final position in the new sequence |
//!
//! A `Move` takes the item out of `from` and reinserts it at `to`, where `to`
//! is measured after the removal. Updates never change positions and may be
//! applied in any order once the structural phases are done.

use std::fmt;

use crate::identity::ListItem;

/// Errors from applying an operation list to a collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// An operation addressed a position past the end of the collection.
    #[error("{op} at index {index} is out of bounds for length {len}")]
    OutOfBounds {
        op: &'static str,
        index: usize,
        len: usize,
    },
    /// The collection holds a different identity at the addressed position.
    #[error("{op} expected identity {key} at index {index}")]
    UnknownIdentity {
        op: &'static str,
        key: String,
        index: usize,
    },
}

/// One reconciliation step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(bound = "T: serde::Serialize, T::Key: serde::Serialize")
)]
pub enum Operation<T: ListItem> {
    /// Drop the item at `index` (old sequence position).
    Remove { key: T::Key, index: usize },
    /// Take the item at `from` out and reinsert it at `to`.
    Move { key: T::Key, from: usize, to: usize },
    /// Insert a new item at its final `index`.
    Insert { item: T, index: usize },
    /// Same identity, changed content, already at its final `index`.
    Update { key: T::Key, item: T, index: usize },
}

impl<T: ListItem> Operation<T> {
    /// Identity the operation refers to.
    #[must_use]
    pub fn key(&self) -> T::Key {
        match self {
            Self::Remove { key, .. } | Self::Move { key, .. } | Self::Update { key, .. } => {
                key.clone()
            }
            Self::Insert { item, .. } => item.key(),
        }
    }

    /// Short, stable name of the variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
        }
    }
}

/// Per-kind operation tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OperationCounts {
    pub removes: usize,
    pub moves: usize,
    pub inserts: usize,
    pub updates: usize,
}

impl OperationCounts {
    /// Total number of operations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.removes + self.moves + self.inserts + self.updates
    }
}

impl fmt::Display for OperationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-{} ~{} +{} *{}",
            self.removes, self.moves, self.inserts, self.updates
        )
    }
}

/// Operations in an order safe for direct sequential application.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(bound = "T: serde::Serialize, T::Key: serde::Serialize")
)]
pub struct OperationList<T: ListItem> {
    ops: Vec<Operation<T>>,
    counts: OperationCounts,
}

impl<T: ListItem> Default for OperationList<T> {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            counts: OperationCounts::default(),
        }
    }
}

impl<T: ListItem> OperationList<T> {
    /// Assemble from phase-ordered parts. Callers guarantee each part is
    /// already sorted the way the module docs describe.
    pub(crate) fn from_phases(
        removes: Vec<Operation<T>>,
        moves: Vec<Operation<T>>,
        inserts: Vec<Operation<T>>,
        updates: Vec<Operation<T>>,
    ) -> Self {
        let counts = OperationCounts {
            removes: removes.len(),
            moves: moves.len(),
            inserts: inserts.len(),
            updates: updates.len(),
        };
        let mut ops = Vec::with_capacity(counts.total());
        ops.extend(removes);
        ops.extend(moves);
        ops.extend(inserts);
        ops.extend(updates);
        Self { ops, counts }
    }

    /// The operations, in application order.
    #[must_use]
    pub fn ops(&self) -> &[Operation<T>] {
        &self.ops
    }

    /// Iterate the operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation<T>> {
        self.ops.iter()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Per-kind tally.
    #[must_use]
    pub fn counts(&self) -> OperationCounts {
        self.counts
    }

    /// Apply to a plain item vector that mirrors the old snapshot.
    ///
    /// # Errors
    ///
    /// Fails on the first operation whose position is out of range or whose
    /// expected identity is not at the addressed position. The vector is left
    /// in whatever state the preceding operations produced.
    pub fn apply_to(&self, target: &mut Vec<T>) -> Result<(), ApplyError> {
        self.apply_with(
            target,
            ListItem::key,
            |item, _| item.clone(),
            |slot, item, _| *slot = item.clone(),
        )
    }

    /// Apply to an arbitrary slot vector.
    ///
    /// `key_of` reads a slot's identity, `mount` creates a slot for an
    /// inserted item, and `rebind` refreshes a slot whose content changed.
    /// Both callbacks receive the item's final position.
    ///
    /// # Errors
    ///
    /// See [`apply_to`](Self::apply_to).
    pub fn apply_with<E>(
        &self,
        target: &mut Vec<E>,
        key_of: impl Fn(&E) -> T::Key,
        mut mount: impl FnMut(&T, usize) -> E,
        mut rebind: impl FnMut(&mut E, &T, usize),
    ) -> Result<(), ApplyError> {
        for op in &self.ops {
            match op {
                Operation::Remove { key, index } => {
                    check_slot(op, target, *index, key, &key_of)?;
                    target.remove(*index);
                }
                Operation::Move { key, from, to } => {
                    check_slot(op, target, *from, key, &key_of)?;
                    let slot = target.remove(*from);
                    if *to > target.len() {
                        let len = target.len();
                        target.insert(*from, slot);
                        return Err(ApplyError::OutOfBounds {
                            op: op.name(),
                            index: *to,
                            len,
                        });
                    }
                    target.insert(*to, slot);
                }
                Operation::Insert { item, index } => {
                    if *index > target.len() {
                        return Err(ApplyError::OutOfBounds {
                            op: op.name(),
                            index: *index,
                            len: target.len(),
                        });
                    }
                    target.insert(*index, mount(item, *index));
                }
                Operation::Update { key, item, index } => {
                    check_slot(op, target, *index, key, &key_of)?;
                    rebind(&mut target[*index], item, *index);
                }
            }
        }
        Ok(())
    }
}

impl<'a, T: ListItem> IntoIterator for &'a OperationList<T> {
    type Item = &'a Operation<T>;
    type IntoIter = std::slice::Iter<'a, Operation<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_slot<T: ListItem, E>(
    op: &Operation<T>,
    target: &[E],
    index: usize,
    key: &T::Key,
    key_of: &impl Fn(&E) -> T::Key,
) -> Result<(), ApplyError> {
    let Some(slot) = target.get(index) else {
        return Err(ApplyError::OutOfBounds {
            op: op.name(),
            index,
            len: target.len(),
        });
    };
    if key_of(slot) != *key {
        return Err(ApplyError::UnknownIdentity {
            op: op.name(),
            key: format!("{key:?}"),
            index,
        });
    }
    Ok(())
}
