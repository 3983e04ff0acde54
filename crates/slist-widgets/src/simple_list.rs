#![forbid(unsafe_code)]

//! The list controller.
//!
//! [`SimpleList`] wires a [`ListHost`] to a [`Reconciler`] and, once bound,
//! to a published item sequence. Rows talk back through [`RowActions`].
//!
//! ```
//! use slist_runtime::Observable;
//! use slist_widgets::{Insets, ListConfig, RowMetrics, RowRenderer, SimpleList};
//!
//! struct Plain;
//!
//! impl RowRenderer<u32> for Plain {
//!     const KIND: &'static str = "plain";
//!     type Row = String;
//!
//!     fn metrics() -> RowMetrics {
//!         RowMetrics::new(30.0, 0.0, Insets::default())
//!     }
//!
//!     fn bind(&self, row: &mut String, item: &u32, _position: usize) {
//!         *row = item.to_string();
//!     }
//! }
//!
//! let source = Observable::new(vec![3, 1, 2]);
//! let mut list = SimpleList::new(Plain, ListConfig::default());
//! list.bind_source(&source);
//! assert_eq!(list.items(), vec![3, 1, 2]);
//!
//! source.set(vec![1, 2]);
//! assert_eq!(list.items(), vec![1, 2]);
//! ```

use std::fmt;

use slist_core::{ListItem, Snapshot, SnapshotError};
use slist_runtime::{
    ApplyOutcome, Observable, PublicationAdapter, ReconcileError, Reconciler,
};

use crate::actions::{RowActions, RowEvent};
use crate::config::ListConfig;
use crate::host::ListHost;
use crate::row::{RowFrame, RowRenderer};

/// A single-column list of rows driven by published item sequences.
pub struct SimpleList<T: ListItem + 'static, R: RowRenderer<T> + 'static> {
    reconciler: Reconciler<T, ListHost<T, R>>,
    adapter: Option<PublicationAdapter<T, ListHost<T, R>>>,
    actions: RowActions<T::Key>,
}

impl<T: ListItem + 'static, R: RowRenderer<T> + 'static> fmt::Debug for SimpleList<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleList")
            .field("kind", &R::KIND)
            .field("bound", &self.adapter.is_some())
            .field("reconciler", &self.reconciler)
            .finish()
    }
}

impl<T: ListItem + 'static, R: RowRenderer<T> + 'static> SimpleList<T, R> {
    #[must_use]
    pub fn new(renderer: R, config: ListConfig) -> Self {
        let host = ListHost::new(renderer, &config);
        Self {
            reconciler: Reconciler::new(host, config.reconciler),
            adapter: None,
            actions: RowActions::new(),
        }
    }

    /// Follow `source`. Replaces any previously bound source.
    pub fn bind_source(&mut self, source: &Observable<Vec<T>>) {
        self.unbind_source();
        self.adapter = Some(PublicationAdapter::connect(source, &self.reconciler));
    }

    /// Stop following the bound source. An in-flight batch still finishes.
    pub fn unbind_source(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.disconnect();
        }
    }

    /// Show `items` directly, without a source.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateIdentity`] and leaves the list
    /// untouched when two items share an identity.
    pub fn update(&self, items: Vec<T>) -> Result<ApplyOutcome, SnapshotError> {
        let snapshot = Snapshot::new(items)?;
        Ok(self.reconciler.apply(snapshot))
    }

    /// Select the row at `position` and report it on the action channel.
    pub fn select(&self, position: usize) -> Option<T::Key> {
        let key = self
            .reconciler
            .with_collection(|host| host.item(position).map(ListItem::key))
            .flatten()?;
        tracing::info!(position, "did select item at");
        self.actions.emit(RowEvent::Selected {
            key: key.clone(),
            position,
        });
        Some(key)
    }

    /// Install the hook run after every row bind.
    pub fn configure_rows(&self, configurator: impl FnMut(&mut R::Row, &T, usize) + 'static) {
        self.reconciler
            .with_collection(move |host| host.configure_rows(configurator));
    }

    /// Run `f` against the host. `None` after teardown.
    pub fn with_host<Out>(&self, f: impl FnOnce(&mut ListHost<T, R>) -> Out) -> Option<Out> {
        self.reconciler.with_collection(f)
    }

    /// End the host's pending animation.
    pub fn finish_animation(&self) -> bool {
        self.with_host(ListHost::finish_animation).unwrap_or(false)
    }

    /// Register the hook that receives failed sessions.
    pub fn on_error(&self, hook: impl FnMut(&ReconcileError) + 'static) {
        self.reconciler.on_error(hook);
    }

    /// Items currently on screen.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.with_host(|host| host.items().cloned().collect())
            .unwrap_or_default()
    }

    /// Row frames currently on screen.
    #[must_use]
    pub fn frames(&self) -> Vec<RowFrame> {
        self.with_host(|host| host.frames()).unwrap_or_default()
    }

    #[must_use]
    pub fn actions(&self) -> &RowActions<T::Key> {
        &self.actions
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<T, ListHost<T, R>> {
        &self.reconciler
    }

    /// Whether a source is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.adapter
            .as_ref()
            .is_some_and(PublicationAdapter::is_connected)
    }

    /// Unbind and release the host. Pending completions become no-ops.
    pub fn teardown(&mut self) {
        self.unbind_source();
        self.reconciler.teardown();
    }
}

impl<T: ListItem + 'static, R: RowRenderer<T> + 'static> Drop for SimpleList<T, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}
