#![forbid(unsafe_code)]

//! Immutable, duplicate-free item sequences.
//!
//! A [`Snapshot`] is "what should be on screen now". It is built once from a
//! published item sequence and never mutated afterwards; a change in data
//! produces a new snapshot (copy-on-change). Clones share storage.
//!
//! # Invariants
//!
//! 1. **Unique identity**: no two items in one snapshot share a key.
//! 2. **Immutable**: the item order and content observed through any clone
//!    never changes.
//! 3. **Indexed**: `index_of(key)` agrees with the position of that key in
//!    `items()` for every key.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Duplicate key | Two items share an identity | `SnapshotError::DuplicateIdentity`, nothing built |

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;

use crate::identity::ListItem;

/// Errors from snapshot construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Two items in one published sequence share an identity.
    #[error("duplicate identity {key} at positions {first} and {second}")]
    DuplicateIdentity {
        /// Debug rendering of the offending key.
        key: String,
        /// Position of the first occurrence.
        first: usize,
        /// Position of the repeated occurrence.
        second: usize,
    },
}

struct Inner<T: ListItem> {
    items: Vec<T>,
    index: AHashMap<T::Key, usize>,
}

/// An immutable, ordered, duplicate-free sequence of items.
///
/// ```
/// use slist_core::{Snapshot, SnapshotError};
///
/// let snap = Snapshot::new(vec![10u32, 20, 30])?;
/// assert_eq!(snap.len(), 3);
/// assert_eq!(snap.index_of(&20), Some(1));
///
/// let err = Snapshot::new(vec![1u32, 2, 1]).unwrap_err();
/// assert!(matches!(err, SnapshotError::DuplicateIdentity { first: 0, second: 2, .. }));
/// # Ok::<(), SnapshotError>(())
/// ```
pub struct Snapshot<T: ListItem> {
    inner: Arc<Inner<T>>,
}

impl<T: ListItem> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ListItem + fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.items.iter()).finish()
    }
}

impl<T: ListItem> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ListItem> Snapshot<T> {
    /// Build a snapshot, rejecting sequences with a repeated identity.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateIdentity`] naming the first key that
    /// appears twice, regardless of whether the two items' content differs.
    pub fn new(items: impl IntoIterator<Item = T>) -> Result<Self, SnapshotError> {
        let items: Vec<T> = items.into_iter().collect();
        let mut index = AHashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            let key = item.key();
            if let Some(&first) = index.get(&key) {
                return Err(SnapshotError::DuplicateIdentity {
                    key: format!("{key:?}"),
                    first,
                    second: pos,
                });
            }
            index.insert(key, pos);
        }
        Ok(Self {
            inner: Arc::new(Inner { items, index }),
        })
    }

    /// The empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                items: Vec::new(),
                index: AHashMap::new(),
            }),
        }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.len()
    }

    /// Whether the snapshot holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.inner.items
    }

    /// Item at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.items.get(index)
    }

    /// Iterate items in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.inner.items.iter()
    }

    /// Iterate keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.inner.items.iter().map(ListItem::key)
    }

    /// Position of the item with `key`.
    #[must_use]
    pub fn index_of(&self, key: &T::Key) -> Option<usize> {
        self.inner.index.get(key).copied()
    }

    /// Whether an item with `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.inner.index.contains_key(key)
    }

    /// Whether both snapshots share storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Same keys in the same order, and every pair content-equal.
    ///
    /// This is exactly the condition under which [`diff`](crate::diff)
    /// returns an empty list.
    #[must_use]
    pub fn content_matches(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.key() == b.key() && a.content_eq(b))
    }
}

impl<'a, T: ListItem> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: &'static str,
        value: u32,
    }

    impl ListItem for Row {
        type Key = &'static str;

        fn key(&self) -> &'static str {
            self.id
        }
    }

    fn row(id: &'static str, value: u32) -> Row {
        Row { id, value }
    }

    #[test]
    fn builds_index_for_every_key() {
        let snap = Snapshot::new(vec![row("a", 1), row("b", 2), row("c", 3)]).unwrap();
        for (pos, item) in snap.iter().enumerate() {
            assert_eq!(snap.index_of(&item.id), Some(pos));
        }
        assert!(snap.contains_key(&"b"));
        assert!(!snap.contains_key(&"z"));
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_identity_rejected_regardless_of_content() {
        let err = Snapshot::new(vec![row("a", 1), row("b", 2), row("a", 99)]).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::DuplicateIdentity {
                key: "\"a\"".to_string(),
                first: 0,
                second: 2,
            }
        );
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn identical_duplicates_also_rejected() {
        let err = Snapshot::new(vec![row("a", 1), row("a", 1)]).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateIdentity { first: 0, second: 1, .. }));
    }

    #[test]
    fn empty_snapshot() {
        let snap: Snapshot<Row> = Snapshot::empty();
        assert!(snap.is_empty());
        assert_eq!(snap.len(), 0);
        assert!(snap.get(0).is_none());
        assert!(snap.content_matches(&Snapshot::default()));
    }

    #[test]
    fn clones_share_storage() {
        let snap = Snapshot::new(vec![row("a", 1)]).unwrap();
        let other = snap.clone();
        assert!(snap.ptr_eq(&other));
        let rebuilt = Snapshot::new(vec![row("a", 1)]).unwrap();
        assert!(!snap.ptr_eq(&rebuilt));
        assert!(snap.content_matches(&rebuilt));
    }

    #[test]
    fn content_matches_detects_order_and_content() {
        let base = Snapshot::new(vec![row("a", 1), row("b", 2)]).unwrap();
        let swapped = Snapshot::new(vec![row("b", 2), row("a", 1)]).unwrap();
        let edited = Snapshot::new(vec![row("a", 1), row("b", 3)]).unwrap();
        assert!(!base.content_matches(&swapped));
        assert!(!base.content_matches(&edited));
    }
}
