#![forbid(unsafe_code)]

//! Item identity model.
//!
//! Every item shown in a list has two comparisons:
//!
//! - **Identity** ([`ListItem::key`]): does this value represent the same
//!   logical entity as another value, possibly in a different snapshot?
//! - **Content** ([`ListItem::content_eq`]): given two values with the same
//!   identity, has anything the row displays changed?
//!
//! # Invariants
//!
//! 1. `key()` is stable for the lifetime of a logical entity.
//! 2. `content_eq(a, b)` implies `a.key() == b.key()`; it is only ever called
//!    on pairs whose keys are already equal.
//!
//! Violating (1) is a caller error. The engine does not detect it beyond
//! rejecting duplicate keys inside one snapshot; a host that later fails to
//! find a row for a key reports it as an identity-instability failure.

use std::fmt::Debug;
use std::hash::Hash;

/// An item that can be placed in a list snapshot.
///
/// The default [`content_eq`](ListItem::content_eq) uses `PartialEq`, which
/// is the right choice when the whole value is what the row displays.
///
/// ```
/// use slist_core::ListItem;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Todo {
///     id: u32,
///     title: String,
/// }
///
/// impl ListItem for Todo {
///     type Key = u32;
///
///     fn key(&self) -> u32 {
///         self.id
///     }
/// }
///
/// let a = Todo { id: 1, title: "milk".into() };
/// let b = Todo { id: 1, title: "oat milk".into() };
/// assert_eq!(a.key(), b.key());
/// assert!(!a.content_eq(&b));
/// ```
pub trait ListItem: Clone + PartialEq {
    /// Identity key. Hashable; no ordering is required.
    type Key: Clone + Eq + Hash + Debug;

    /// Stable identity of this item.
    fn key(&self) -> Self::Key;

    /// Whether two same-identity items display identical content.
    fn content_eq(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! impl_list_item_for_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ListItem for $ty {
                type Key = $ty;

                #[inline]
                fn key(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

// Values that are their own identity; content can never change.
impl_list_item_for_primitive!(u8, u16, u32, u64, usize, i32, i64, char, String, &'static str);
