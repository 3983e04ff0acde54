#![forbid(unsafe_code)]

//! Visual collection contract and completion signalling.
//!
//! The reconciler never mutates rows itself. It hands a [`Batch`] to a
//! [`VisualCollection`] host together with a one-shot [`Completion`], and
//! waits for the host to signal that the batch is fully on screen (for an
//! animated host, that is when the animation ends).
//!
//! # Completion Rules
//!
//! | Host action | Effect |
//! |-------------|--------|
//! | `completion.finished()` | last-applied advances, queued snapshot (if any) starts |
//! | `completion.failed(err)` | session fails, queued snapshot dropped, state recovered |
//! | completion dropped unsignalled | same as `failed(CollectionError::Abandoned)` |
//! | signal after teardown | silent no-op |
//!
//! A host may signal synchronously from inside [`VisualCollection::apply`];
//! the reconciler defers handling until `apply` returns.

use std::fmt;
use std::rc::{Rc, Weak};

use slist_core::{ApplyError, ListItem, OperationList, Snapshot};

/// Identifier of one reconciliation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors a host reports for a batch it could not apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// An operation could not be performed on the host's rows.
    #[error(transparent)]
    Apply(#[from] ApplyError),
    /// The completion was dropped without being signalled.
    #[error("batch completion was dropped without a signal")]
    Abandoned,
    /// Host-specific failure.
    #[error("host failure: {0}")]
    Host(String),
}

impl CollectionError {
    /// The host was asked to touch an identity it is not showing at the
    /// addressed position, which means a key was not stable across
    /// publications.
    #[must_use]
    pub fn is_identity_instability(&self) -> bool {
        matches!(self, Self::Apply(ApplyError::UnknownIdentity { .. }))
    }
}

/// One batch of work for a host.
#[derive(Debug, Clone)]
pub struct Batch<T: ListItem> {
    /// Session this batch belongs to.
    pub session: SessionId,
    /// Snapshot the host currently reflects.
    pub old: Snapshot<T>,
    /// Snapshot the host should reflect once the batch is applied.
    pub new: Snapshot<T>,
    /// Operations to apply in order. Never empty.
    pub ops: OperationList<T>,
    /// Whether the host should animate the transition.
    pub animate: bool,
}

pub(crate) trait CompletionSink {
    fn complete(self: Rc<Self>, session: SessionId, outcome: Result<(), CollectionError>);
}

/// One-shot completion signal for a [`Batch`].
#[must_use = "an unsignalled completion fails its session when dropped"]
pub struct Completion {
    sink: Option<Weak<dyn CompletionSink>>,
    session: SessionId,
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("session", &self.session)
            .field("pending", &self.sink.is_some())
            .finish()
    }
}

impl Completion {
    pub(crate) fn new(sink: Weak<dyn CompletionSink>, session: SessionId) -> Self {
        Self {
            sink: Some(sink),
            session,
        }
    }

    /// Session this completion belongs to.
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// The batch is fully reflected on screen.
    pub fn finished(mut self) {
        self.fire(Ok(()));
    }

    /// The batch could not be applied.
    pub fn failed(mut self, error: CollectionError) {
        self.fire(Err(error));
    }

    fn fire(&mut self, outcome: Result<(), CollectionError>) {
        // A dead reconciler means the owning screen is gone.
        if let Some(sink) = self.sink.take().and_then(|weak| weak.upgrade()) {
            sink.complete(self.session, outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.sink.is_some() {
            self.fire(Err(CollectionError::Abandoned));
        }
    }
}

/// A host that shows rows and can apply operation batches to them.
pub trait VisualCollection<T: ListItem> {
    /// Apply `batch` and signal `completion` once it is on screen.
    fn apply(&mut self, batch: Batch<T>, completion: Completion);

    /// Items the host actually shows, in order, when it can tell.
    ///
    /// Used to resynchronize after a failed batch.
    fn observed_items(&self) -> Option<Vec<T>> {
        None
    }
}

/// When a [`ModelCollection`] signals completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Signal from inside `apply`.
    #[default]
    Immediate,
    /// Hold the completion until [`ModelCollection::finish_pending`].
    Deferred,
}

/// In-memory host that mirrors items in a plain vector.
///
/// Useful as the reference host in tests and for headless consumers.
#[derive(Debug)]
pub struct ModelCollection<T: ListItem> {
    items: Vec<T>,
    mode: CompletionMode,
    pending: Option<Completion>,
    fail_next: Option<CollectionError>,
    batches: Vec<SessionId>,
}

impl<T: ListItem> Default for ModelCollection<T> {
    fn default() -> Self {
        Self::new(CompletionMode::Immediate)
    }
}

impl<T: ListItem> ModelCollection<T> {
    #[must_use]
    pub fn new(mode: CompletionMode) -> Self {
        Self {
            items: Vec::new(),
            mode,
            pending: None,
            fail_next: None,
            batches: Vec::new(),
        }
    }

    /// Items currently shown.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Sessions received so far, in order.
    #[must_use]
    pub fn batches(&self) -> &[SessionId] {
        &self.batches
    }

    /// Whether a deferred completion is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Signal the held completion. Returns `false` if nothing was pending.
    pub fn finish_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(completion) => {
                completion.finished();
                true
            }
            None => false,
        }
    }

    /// Take the held completion so the caller can signal it later.
    pub fn take_pending(&mut self) -> Option<Completion> {
        self.pending.take()
    }

    /// Fail the next batch with `error` instead of applying it.
    pub fn fail_next(&mut self, error: CollectionError) {
        self.fail_next = Some(error);
    }

    /// Overwrite the shown items, bypassing reconciliation.
    pub fn force_items(&mut self, items: Vec<T>) {
        self.items = items;
    }
}

impl<T: ListItem> VisualCollection<T> for ModelCollection<T> {
    fn apply(&mut self, batch: Batch<T>, completion: Completion) {
        self.batches.push(batch.session);
        if let Some(error) = self.fail_next.take() {
            completion.failed(error);
            return;
        }
        if let Err(error) = batch.ops.apply_to(&mut self.items) {
            completion.failed(error.into());
            return;
        }
        match self.mode {
            CompletionMode::Immediate => completion.finished(),
            CompletionMode::Deferred => self.pending = Some(completion),
        }
    }

    fn observed_items(&self) -> Option<Vec<T>> {
        Some(self.items.clone())
    }
}
