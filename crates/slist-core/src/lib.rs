#![forbid(unsafe_code)]

//! Identity, snapshots, and list diffing for SimpleList.
//!
//! This crate holds the pure half of list synchronization:
//! - [`ListItem`] for the identity/content contract every row item satisfies
//! - [`Snapshot`] for an immutable, duplicate-free ordered item sequence
//! - [`diff`] for turning two snapshots into an [`OperationList`] that can be
//!   applied sequentially to an index-addressed collection
//!
//! Nothing here touches a visual collection or holds mutable shared state;
//! see `slist-runtime` for the reconciler that drives these pieces.

pub mod diff;
pub mod identity;
pub mod operation;
pub mod snapshot;

pub use diff::diff;
pub use identity::ListItem;
pub use operation::{ApplyError, Operation, OperationCounts, OperationList};
pub use snapshot::{Snapshot, SnapshotError};
