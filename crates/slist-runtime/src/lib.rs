#![forbid(unsafe_code)]

//! Runtime half of SimpleList list synchronization.
//!
//! Data owners publish item sequences on a latest-value [`Observable`]; a
//! [`PublicationAdapter`] turns each one into a snapshot and feeds a
//! [`Reconciler`], which diffs it against what is on screen and hands the
//! resulting batch to a [`VisualCollection`] host, one batch at a time.
//!
//! ```text
//! owner ──set──▶ Observable<Vec<T>> ──▶ PublicationAdapter ──Snapshot──▶ Reconciler
//!                                                                          │ Batch + Completion
//!                                                                          ▼
//!                                                                   VisualCollection
//! ```
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and must be driven
//! from the same context that mutates the visual collection.

pub mod adapter;
pub mod collection;
pub mod config;
pub mod reactive;
pub mod reconciler;

pub use adapter::{PublicationAdapter, publish};
pub use collection::{
    Batch, CollectionError, Completion, CompletionMode, ModelCollection, SessionId,
    VisualCollection,
};
pub use config::{ConfigError, ReconcilerConfig};
pub use reactive::{Observable, Subscription};
pub use reconciler::{ApplyOutcome, ReconcileError, Reconciler, ReconcilerStats};

pub use slist_core::{
    ApplyError, ListItem, Operation, OperationCounts, OperationList, Snapshot, SnapshotError,
    diff,
};
