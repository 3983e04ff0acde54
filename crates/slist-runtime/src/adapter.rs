#![forbid(unsafe_code)]

//! Bridge from a published item sequence to the reconciler.
//!
//! A [`PublicationAdapter`] subscribes to an [`Observable<Vec<T>>`], turns
//! every published value (including the one replayed on subscribe) into a
//! [`Snapshot`], and feeds it to a [`Reconciler`].
//!
//! # Invariants
//!
//! 1. A sequence with a repeated identity is rejected before it reaches the
//!    reconciler; last-applied is unchanged.
//! 2. After [`disconnect`](PublicationAdapter::disconnect) nothing more is
//!    fed and any queued snapshot is dropped. An in-flight session runs to
//!    completion.
//!
//! Publishers that want the duplicate-identity error synchronously use
//! [`publish`] instead of [`Observable::set`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slist_core::{ListItem, Snapshot, SnapshotError};

use crate::collection::VisualCollection;
use crate::reactive::{Observable, Subscription};
use crate::reconciler::Reconciler;

type RejectHook = Box<dyn FnMut(&SnapshotError)>;

#[derive(Default)]
struct FeedState {
    connected: Cell<bool>,
    fed: Cell<u64>,
    rejected: Cell<u64>,
    last_rejection: RefCell<Option<SnapshotError>>,
    on_rejected: RefCell<Option<RejectHook>>,
}

impl FeedState {
    fn reject(&self, error: SnapshotError) {
        tracing::warn!(error = %error, "rejected published list");
        self.rejected.set(self.rejected.get() + 1);
        *self.last_rejection.borrow_mut() = Some(error.clone());

        let hook = self.on_rejected.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(&error);
            let mut slot = self.on_rejected.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

/// Feeds snapshots from an observable item sequence into a reconciler.
pub struct PublicationAdapter<T: ListItem, C> {
    subscription: Option<Subscription>,
    reconciler: Reconciler<T, C>,
    state: Rc<FeedState>,
}

impl<T: ListItem, C> fmt::Debug for PublicationAdapter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicationAdapter")
            .field("connected", &self.state.connected.get())
            .field("fed", &self.state.fed.get())
            .field("rejected", &self.state.rejected.get())
            .finish()
    }
}

impl<T, C> PublicationAdapter<T, C>
where
    T: ListItem + 'static,
    C: VisualCollection<T> + 'static,
{
    /// Subscribe to `source`. The current value, if any, is fed immediately.
    pub fn connect(source: &Observable<Vec<T>>, reconciler: &Reconciler<T, C>) -> Self {
        let state = Rc::new(FeedState::default());
        state.connected.set(true);

        let feed = Rc::clone(&state);
        let target = reconciler.clone();
        let subscription = source.subscribe(move |items: &Vec<T>| {
            if !feed.connected.get() {
                return;
            }
            match Snapshot::new(items.iter().cloned()) {
                Ok(snapshot) => {
                    feed.fed.set(feed.fed.get() + 1);
                    target.apply(snapshot);
                }
                Err(error) => feed.reject(error),
            }
        });

        Self {
            subscription: Some(subscription),
            reconciler: reconciler.clone(),
            state,
        }
    }

    /// Stop feeding and drop any queued snapshot.
    pub fn disconnect(&mut self) {
        if !self.state.connected.replace(false) {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if self.reconciler.discard_queued() {
            tracing::debug!("dropped queued list snapshot on disconnect");
        }
    }
}

impl<T: ListItem, C> PublicationAdapter<T, C> {
    /// Register the hook that receives rejected sequences.
    pub fn on_rejected(&self, hook: impl FnMut(&SnapshotError) + 'static) {
        *self.state.on_rejected.borrow_mut() = Some(Box::new(hook));
    }

    /// Whether the adapter is still subscribed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.connected.get()
    }

    /// Snapshots handed to the reconciler so far.
    #[must_use]
    pub fn fed_count(&self) -> u64 {
        self.state.fed.get()
    }

    /// Published sequences rejected so far.
    #[must_use]
    pub fn rejected_count(&self) -> u64 {
        self.state.rejected.get()
    }

    /// Most recent rejection.
    #[must_use]
    pub fn last_rejection(&self) -> Option<SnapshotError> {
        self.state.last_rejection.borrow().clone()
    }
}

impl<T: ListItem, C> Drop for PublicationAdapter<T, C> {
    fn drop(&mut self) {
        if self.state.connected.replace(false) {
            self.subscription = None;
            self.reconciler.discard_queued();
        }
    }
}

/// Validate `items` and publish them on `source`.
///
/// # Errors
///
/// Returns [`SnapshotError::DuplicateIdentity`] without publishing when two
/// items share an identity.
pub fn publish<T: ListItem + 'static>(
    source: &Observable<Vec<T>>,
    items: Vec<T>,
) -> Result<(), SnapshotError> {
    Snapshot::new(items.iter().cloned())?;
    source.set(items);
    Ok(())
}
