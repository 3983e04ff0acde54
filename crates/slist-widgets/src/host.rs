#![forbid(unsafe_code)]

//! Visual collection host for a single column of rows.
//!
//! [`ListHost`] keeps one mounted row per shown item, applies operation
//! batches to them, and lays them out with the renderer's fixed metrics.
//!
//! # Invariants
//!
//! 1. Rows are bound only when mounted for an `Insert` or refreshed for an
//!    `Update`. Moves and removals never call the renderer.
//! 2. Every `Remove`, `Move` and `Update` is checked against the identity
//!    of the row it addresses before anything is touched.
//! 3. The row configurator, when set, runs right after every bind.
//! 4. `position_of` reflects the rows after every batch, including a
//!    partially applied failed one.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Addressed row has another identity | batch fails with `UnknownIdentity`, rows stay as far as applied |
//! | Index outside the rows | batch fails with `OutOfBounds` |
//! | Host dropped with an animation pending | completion reports `Abandoned` |

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use ahash::AHashMap;
use slist_core::{ListItem, Operation, OperationCounts};
use slist_runtime::{Batch, CollectionError, Completion, SessionId, VisualCollection};
use web_time::Instant;

use crate::config::ListConfig;
use crate::row::{RowFrame, RowMetrics, RowRenderer};

/// Hook run after every bind, used to wire row controls.
pub type RowConfigurator<T, Row> = Box<dyn FnMut(&mut Row, &T, usize)>;

struct MountedRow<T, Row> {
    item: T,
    row: Row,
    binds: u64,
}

struct PendingAnimation {
    completion: Completion,
    started: Instant,
}

/// Summary of the most recent batch a host received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub session: SessionId,
    pub counts: OperationCounts,
    pub animated: bool,
}

/// Hosts rows produced by `R` for items of type `T`.
pub struct ListHost<T: ListItem, R: RowRenderer<T>> {
    renderer: R,
    metrics: RowMetrics,
    rows: Vec<MountedRow<T, R::Row>>,
    positions: AHashMap<T::Key, usize>,
    configure: Option<RowConfigurator<T, R::Row>>,
    deferred_completion: bool,
    viewport_height: f32,
    pending: Option<PendingAnimation>,
    last_batch: Option<BatchSummary>,
    binds: u64,
    mounts: u64,
}

impl<T: ListItem, R: RowRenderer<T>> fmt::Debug for ListHost<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListHost")
            .field("kind", &R::KIND)
            .field("rows", &self.rows.len())
            .field("metrics", &self.metrics)
            .field("animating", &self.pending.is_some())
            .field("binds", &self.binds)
            .finish()
    }
}

impl<T: ListItem, R: RowRenderer<T>> ListHost<T, R> {
    /// Create an empty host. Metrics are read from `R` once, here.
    pub fn new(renderer: R, config: &ListConfig) -> Self {
        let config = config.sanitized();
        let metrics = R::metrics().sanitized();
        tracing::debug!(kind = R::KIND, height = metrics.height, "list host created");
        Self {
            renderer,
            metrics,
            rows: Vec::new(),
            positions: AHashMap::new(),
            configure: None,
            deferred_completion: config.deferred_completion,
            viewport_height: config.viewport_height,
            pending: None,
            last_batch: None,
            binds: 0,
            mounts: 0,
        }
    }

    /// Install the row configurator and run it over the mounted rows.
    pub fn configure_rows(&mut self, configurator: impl FnMut(&mut R::Row, &T, usize) + 'static) {
        let mut configurator: RowConfigurator<T, R::Row> = Box::new(configurator);
        for (position, mounted) in self.rows.iter_mut().enumerate() {
            configurator(&mut mounted.row, &mounted.item, position);
        }
        self.configure = Some(configurator);
    }

    /// Row kind tag of the renderer.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        R::KIND
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn metrics(&self) -> RowMetrics {
        self.metrics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Item shown at `position`.
    #[must_use]
    pub fn item(&self, position: usize) -> Option<&T> {
        self.rows.get(position).map(|mounted| &mounted.item)
    }

    /// Row at `position`.
    #[must_use]
    pub fn row(&self, position: usize) -> Option<&R::Row> {
        self.rows.get(position).map(|mounted| &mounted.row)
    }

    pub fn row_mut(&mut self, position: usize) -> Option<&mut R::Row> {
        self.rows.get_mut(position).map(|mounted| &mut mounted.row)
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &R::Row> + '_ {
        self.rows.iter().map(|mounted| &mounted.row)
    }

    /// Items in display order.
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().map(|mounted| &mounted.item)
    }

    /// Position of the row showing `key`.
    #[must_use]
    pub fn position_of(&self, key: &T::Key) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// How many times the row at `position` has been bound.
    #[must_use]
    pub fn binds_at(&self, position: usize) -> Option<u64> {
        self.rows.get(position).map(|mounted| mounted.binds)
    }

    /// Renderer invocations so far.
    #[must_use]
    pub fn bind_count(&self) -> u64 {
        self.binds
    }

    /// Rows mounted so far.
    #[must_use]
    pub fn mount_count(&self) -> u64 {
        self.mounts
    }

    #[must_use]
    pub fn last_batch(&self) -> Option<BatchSummary> {
        self.last_batch
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Frame of the row at `position`.
    #[must_use]
    pub fn frame(&self, position: usize) -> Option<RowFrame> {
        (position < self.rows.len()).then(|| self.frame_unchecked(position))
    }

    fn frame_unchecked(&self, position: usize) -> RowFrame {
        RowFrame {
            y: self.metrics.insets.top + position as f32 * self.metrics.stride(),
            height: self.metrics.height,
        }
    }

    /// Frames of every row, in order.
    #[must_use]
    pub fn frames(&self) -> Vec<RowFrame> {
        (0..self.rows.len())
            .map(|position| self.frame_unchecked(position))
            .collect()
    }

    /// Total scrollable height including insets.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        let n = self.rows.len();
        let rows = if n == 0 {
            0.0
        } else {
            n as f32 * self.metrics.height + (n - 1) as f32 * self.metrics.spacing
        };
        self.metrics.insets.vertical() + rows
    }

    /// Positions of rows visible with the viewport scrolled to `scroll_y`.
    #[must_use]
    pub fn visible_range(&self, scroll_y: f32) -> Range<usize> {
        let n = self.rows.len();
        let top = if scroll_y.is_finite() { scroll_y.max(0.0) } else { 0.0 };
        let bottom = top + self.viewport_height;
        let stride = self.metrics.stride();

        let offset = (top - self.metrics.insets.top).max(0.0);
        let mut start = ((offset / stride).floor() as usize).min(n);
        while start < n && !self.frame_unchecked(start).intersects(top, bottom) {
            if self.frame_unchecked(start).y >= bottom {
                return start..start;
            }
            start += 1;
        }
        let mut end = start;
        while end < n && self.frame_unchecked(end).intersects(top, bottom) {
            end += 1;
        }
        start..end
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    /// Whether an animated batch is waiting for [`finish_animation`](Self::finish_animation).
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    /// Time since the pending animation started.
    #[must_use]
    pub fn animation_elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(|pending| pending.started.elapsed())
    }

    /// End the pending animation and signal its batch as finished.
    pub fn finish_animation(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        tracing::trace!(
            session = %pending.completion.session(),
            elapsed_us = micros(pending.started.elapsed()),
            "list animation finished"
        );
        pending.completion.finished();
        true
    }

    /// Abort the pending animation and fail its batch.
    pub fn interrupt_animation(&mut self, reason: impl Into<String>) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        pending
            .completion
            .failed(CollectionError::Host(reason.into()));
        true
    }

    fn bind_at(&mut self, position: usize) {
        let Some(mounted) = self.rows.get_mut(position) else {
            return;
        };
        self.renderer.bind(&mut mounted.row, &mounted.item, position);
        mounted.binds += 1;
        self.binds += 1;
        if let Some(configure) = self.configure.as_mut() {
            configure(&mut mounted.row, &mounted.item, position);
        }
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (position, mounted) in self.rows.iter().enumerate() {
            self.positions.insert(mounted.item.key(), position);
        }
    }
}

impl<T: ListItem, R: RowRenderer<T>> VisualCollection<T> for ListHost<T, R> {
    fn apply(&mut self, batch: Batch<T>, completion: Completion) {
        let counts = batch.ops.counts();
        self.last_batch = Some(BatchSummary {
            session: batch.session,
            counts,
            animated: batch.animate,
        });

        let mut mounted = 0u64;
        let result = batch.ops.apply_with(
            &mut self.rows,
            |slot| slot.item.key(),
            |item, _| {
                mounted += 1;
                MountedRow {
                    item: item.clone(),
                    row: R::Row::default(),
                    binds: 0,
                }
            },
            |slot, item, _| slot.item = item.clone(),
        );
        self.mounts += mounted;
        self.reindex();

        if let Err(error) = result {
            completion.failed(error.into());
            return;
        }

        // Insert and update indices are final positions.
        let rebind: Vec<usize> = batch
            .ops
            .iter()
            .filter_map(|op| match op {
                Operation::Insert { index, .. } | Operation::Update { index, .. } => Some(*index),
                Operation::Remove { .. } | Operation::Move { .. } => None,
            })
            .collect();
        for position in rebind {
            self.bind_at(position);
        }

        if self.deferred_completion && batch.animate {
            self.pending = Some(PendingAnimation {
                completion,
                started: Instant::now(),
            });
        } else {
            completion.finished();
        }
    }

    fn observed_items(&self) -> Option<Vec<T>> {
        Some(self.items().cloned().collect())
    }
}

fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
