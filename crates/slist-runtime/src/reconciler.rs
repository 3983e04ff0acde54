#![forbid(unsafe_code)]

//! Single-session list reconciler.
//!
//! The [`Reconciler`] owns the "last applied" snapshot and a
//! [`VisualCollection`] host. Each accepted snapshot is diffed against the
//! last applied one and handed to the host as a [`Batch`]; the next batch
//! only starts once the host signals completion.
//!
//! # Invariants
//!
//! 1. **One session in flight**: the host never receives a batch while a
//!    previous batch is still unsignalled.
//! 2. **Depth-one queue**: while a session is in flight, a newly accepted
//!    snapshot replaces any queued one. Intermediate states are dropped;
//!    only the final state is guaranteed to reach the screen.
//! 3. **No empty batches**: a snapshot that diffs to nothing is recorded as
//!    applied without involving the host.
//! 4. **Single writer**: last-applied changes only here, only on the
//!    consumer context.
//! 5. **No re-entrant dispatch**: completions signalled while the host is
//!    borrowed (inside `apply` or [`Reconciler::with_collection`]) are
//!    handled after the borrow ends.
//! 6. **Liveness**: after [`Reconciler::teardown`], completions and
//!    snapshots are silently ignored and the host is released. A teardown
//!    issued while the host is borrowed releases it when that borrow ends.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Host fails a batch | `ReconcileError::Failed` to the error hook, warn log, queued snapshot dropped |
//! | Host reports its items | last-applied resynced to them |
//! | Host cannot report items | last-applied set to the attempted snapshot |
//! | Completion dropped unsignalled | treated as a failure (`Abandoned`) |
//! | Stale or duplicate completion | ignored |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use slist_core::{ListItem, Snapshot, diff};
use web_time::Instant;

use crate::collection::{
    Batch, CollectionError, Completion, CompletionSink, SessionId, VisualCollection,
};
use crate::config::ReconcilerConfig;

/// A failed reconciliation session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The host could not apply the session's batch.
    #[error("reconciliation session {session} failed: {source}")]
    Failed {
        session: SessionId,
        #[source]
        source: CollectionError,
    },
}

impl ReconcileError {
    /// Session that failed.
    #[must_use]
    pub fn session(&self) -> SessionId {
        match self {
            Self::Failed { session, .. } => *session,
        }
    }
}

/// What [`Reconciler::apply`] did with a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A session started. It may already have completed.
    Started(SessionId),
    /// Nothing to do; the snapshot matches what is shown.
    Unchanged,
    /// A session is in flight; the snapshot waits. `superseded` is true when
    /// it replaced an older queued snapshot.
    Queued { superseded: bool },
    /// The reconciler was torn down.
    Closed,
}

/// Session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerStats {
    pub sessions_started: u64,
    pub sessions_completed: u64,
    pub sessions_failed: u64,
    pub snapshots_coalesced: u64,
    pub unchanged_skipped: u64,
}

struct InFlight<T: ListItem> {
    id: SessionId,
    target: Snapshot<T>,
    started: Instant,
}

struct State<T: ListItem> {
    config: ReconcilerConfig,
    last_applied: Snapshot<T>,
    in_flight: Option<InFlight<T>>,
    queued: Option<Snapshot<T>>,
    deferred: Option<(SessionId, Result<(), CollectionError>)>,
    next_session: u64,
    host_busy: bool,
    alive: bool,
    release_pending: bool,
    stats: ReconcilerStats,
    last_error: Option<ReconcileError>,
}

type ErrorHook = Box<dyn FnMut(&ReconcileError)>;

struct Shared<T: ListItem, C> {
    state: RefCell<State<T>>,
    host: RefCell<Option<C>>,
    on_error: RefCell<Option<ErrorHook>>,
}

enum Step<T: ListItem> {
    Finish(SessionId, Result<(), CollectionError>),
    Start(Snapshot<T>),
}

/// Drives a [`VisualCollection`] from a stream of snapshots.
///
/// Cloning yields another handle to the same reconciler.
pub struct Reconciler<T: ListItem, C> {
    shared: Rc<Shared<T, C>>,
}

impl<T: ListItem, C> Clone for Reconciler<T, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: ListItem, C> fmt::Debug for Reconciler<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("Reconciler")
            .field("alive", &state.alive)
            .field("shown", &state.last_applied.len())
            .field("in_flight", &state.in_flight.as_ref().map(|f| f.id))
            .field("queued", &state.queued.is_some())
            .field("stats", &state.stats)
            .finish()
    }
}

impl<T, C> Reconciler<T, C>
where
    T: ListItem + 'static,
    C: VisualCollection<T> + 'static,
{
    /// Create a reconciler for a host that currently shows nothing.
    pub fn new(host: C, config: ReconcilerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(State {
                    config,
                    last_applied: Snapshot::empty(),
                    in_flight: None,
                    queued: None,
                    deferred: None,
                    next_session: 1,
                    host_busy: false,
                    alive: true,
                    release_pending: false,
                    stats: ReconcilerStats::default(),
                    last_error: None,
                }),
                host: RefCell::new(Some(host)),
                on_error: RefCell::new(None),
            }),
        }
    }

    /// Accept the next desired snapshot.
    pub fn apply(&self, snapshot: Snapshot<T>) -> ApplyOutcome {
        {
            let mut state = self.shared.state.borrow_mut();
            if !state.alive {
                return ApplyOutcome::Closed;
            }
            if state.in_flight.is_some() || state.host_busy || state.deferred.is_some() {
                let superseded = state.queued.replace(snapshot).is_some();
                if superseded {
                    state.stats.snapshots_coalesced += 1;
                    tracing::debug!(
                        coalesced = state.stats.snapshots_coalesced,
                        "queued list snapshot superseded"
                    );
                }
                return ApplyOutcome::Queued { superseded };
            }
        }
        let outcome = self.shared.start(snapshot);
        self.shared.pump();
        outcome
    }

    /// Run `f` against the host.
    ///
    /// Returns `None` after teardown or when the host is already borrowed.
    /// Completions signalled inside `f` are handled once `f` returns.
    pub fn with_collection<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let result = self.shared.with_host(f);
        self.shared.pump();
        result
    }

    /// Register the hook that receives failed sessions.
    pub fn on_error(&self, hook: impl FnMut(&ReconcileError) + 'static) {
        *self.shared.on_error.borrow_mut() = Some(Box::new(hook));
    }

    /// Stop reconciling and release the host.
    ///
    /// An in-flight batch is not aborted, but its completion becomes a no-op.
    pub fn teardown(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if !state.alive {
                return;
            }
            state.alive = false;
            state.queued = None;
            state.deferred = None;
            tracing::debug!(
                in_flight = state.in_flight.is_some(),
                "list reconciler torn down"
            );
        }
        // Dropped outside every borrow: the host may own a pending completion.
        match self.shared.host.try_borrow_mut() {
            Ok(mut slot) => {
                let host = slot.take();
                drop(slot);
                drop(host);
            }
            // Torn down from inside a host borrow; the borrower releases it.
            Err(_) => self.shared.state.borrow_mut().release_pending = true,
        }
    }
}

impl<T: ListItem, C> Reconciler<T, C> {
    /// Drop the queued snapshot, if any. An in-flight session is unaffected.
    pub fn discard_queued(&self) -> bool {
        self.shared.state.borrow_mut().queued.take().is_some()
    }

    /// Snapshot the host is known to reflect.
    #[must_use]
    pub fn last_applied(&self) -> Snapshot<T> {
        self.shared.state.borrow().last_applied.clone()
    }

    /// Session currently in flight.
    #[must_use]
    pub fn current_session(&self) -> Option<SessionId> {
        self.shared.state.borrow().in_flight.as_ref().map(|f| f.id)
    }

    /// Whether a session is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.state.borrow().in_flight.is_some()
    }

    /// Whether a snapshot is waiting for the in-flight session to finish.
    #[must_use]
    pub fn has_queued(&self) -> bool {
        self.shared.state.borrow().queued.is_some()
    }

    /// Whether [`teardown`](Reconciler::teardown) has not been called.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.shared.state.borrow().alive
    }

    /// Session counters.
    #[must_use]
    pub fn stats(&self) -> ReconcilerStats {
        self.shared.state.borrow().stats
    }

    /// Most recent failure.
    #[must_use]
    pub fn last_error(&self) -> Option<ReconcileError> {
        self.shared.state.borrow().last_error.clone()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> ReconcilerConfig {
        self.shared.state.borrow().config.clone()
    }
}

impl<T, C> Shared<T, C>
where
    T: ListItem + 'static,
    C: VisualCollection<T> + 'static,
{
    fn with_host<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        if !self.state.borrow().alive {
            return None;
        }
        let mut slot = self.host.try_borrow_mut().ok()?;
        let host = slot.as_mut()?;
        self.state.borrow_mut().host_busy = true;
        let result = f(host);
        drop(slot);
        let release = {
            let mut state = self.state.borrow_mut();
            state.host_busy = false;
            std::mem::take(&mut state.release_pending)
        };
        if release {
            self.release_host();
        }
        Some(result)
    }

    fn release_host(&self) {
        let host = self
            .host
            .try_borrow_mut()
            .ok()
            .and_then(|mut slot| slot.take());
        drop(host);
    }

    /// Handle deferred completions and start queued snapshots until idle.
    fn pump(self: &Rc<Self>) {
        loop {
            let step = {
                let mut state = self.state.borrow_mut();
                if !state.alive || state.host_busy {
                    return;
                }
                if let Some((session, outcome)) = state.deferred.take() {
                    Step::Finish(session, outcome)
                } else if state.in_flight.is_none() {
                    match state.queued.take() {
                        Some(next) => Step::Start(next),
                        None => return,
                    }
                } else {
                    return;
                }
            };
            match step {
                Step::Finish(session, outcome) => self.finish(session, outcome),
                Step::Start(next) => {
                    self.start(next);
                }
            }
        }
    }

    fn start(self: &Rc<Self>, snapshot: Snapshot<T>) -> ApplyOutcome {
        let batch = {
            let mut state = self.state.borrow_mut();
            let ops = diff(&state.last_applied, &snapshot);
            if ops.is_empty() {
                state.last_applied = snapshot;
                state.stats.unchanged_skipped += 1;
                return ApplyOutcome::Unchanged;
            }

            let id = SessionId(state.next_session);
            state.next_session += 1;
            state.stats.sessions_started += 1;
            tracing::debug!(session = %id, ops = %ops.counts(), "list reconciliation started");
            state.in_flight = Some(InFlight {
                id,
                target: snapshot.clone(),
                started: Instant::now(),
            });
            Batch {
                session: id,
                old: state.last_applied.clone(),
                new: snapshot,
                ops,
                animate: state.config.animate_differences,
            }
        };

        let id = batch.session;
        let sink: Weak<dyn CompletionSink> = Rc::downgrade(self) as Weak<dyn CompletionSink>;
        let completion = Completion::new(sink, id);
        // If the host slot is unavailable the closure (and the completion in
        // it) is dropped, which reports the batch as abandoned.
        let _ = self.with_host(move |host| host.apply(batch, completion));
        ApplyOutcome::Started(id)
    }

    fn finish(&self, session: SessionId, outcome: Result<(), CollectionError>) {
        let failure = {
            let mut state = self.state.borrow_mut();
            let Some(flight) = state.in_flight.take_if(|f| f.id == session) else {
                return;
            };
            match outcome {
                Ok(()) => {
                    state.last_applied = flight.target;
                    state.stats.sessions_completed += 1;
                    tracing::debug!(
                        session = %session,
                        elapsed_us = micros(flight.started.elapsed()),
                        "list reconciliation finished"
                    );
                    None
                }
                Err(source) => {
                    state.stats.sessions_failed += 1;
                    let dropped_queued = state.queued.take().is_some();
                    Some((flight.target, source, dropped_queued))
                }
            }
        };
        if let Some((attempted, source, dropped_queued)) = failure {
            self.recover(session, attempted, source, dropped_queued);
        }
    }

    fn recover(
        &self,
        session: SessionId,
        attempted: Snapshot<T>,
        source: CollectionError,
        dropped_queued: bool,
    ) {
        let recover_observed = self.state.borrow().config.recover_from_observed_state;
        let observed = if recover_observed {
            self.with_host(|host| host.observed_items()).flatten()
        } else {
            None
        };
        let (restored, resynced) = match observed.map(Snapshot::new) {
            Some(Ok(snapshot)) => (snapshot, true),
            _ => (attempted, false),
        };

        tracing::warn!(
            session = %session,
            error = %source,
            identity_instability = source.is_identity_instability(),
            resynced_from_host = resynced,
            dropped_queued,
            "list reconciliation failed; on-screen rows may be stale until the next publication"
        );

        let error = ReconcileError::Failed { session, source };
        {
            let mut state = self.state.borrow_mut();
            state.last_applied = restored;
            state.last_error = Some(error.clone());
        }

        // Taken out so the hook may call back into the reconciler.
        let hook = self.on_error.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(&error);
            let mut slot = self.on_error.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

impl<T, C> CompletionSink for Shared<T, C>
where
    T: ListItem + 'static,
    C: VisualCollection<T> + 'static,
{
    fn complete(self: Rc<Self>, session: SessionId, outcome: Result<(), CollectionError>) {
        {
            let mut state = self.state.borrow_mut();
            if !state.alive {
                return;
            }
            if state.in_flight.as_ref().map(|f| f.id) != Some(session) {
                tracing::debug!(session = %session, "ignoring stale list completion");
                return;
            }
            state.deferred = Some((session, outcome));
        }
        // Returns immediately while the host is borrowed; the borrower pumps.
        self.pump();
    }
}

fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CompletionMode, ModelCollection};
    use slist_core::ApplyError;
    use std::cell::Cell;

    fn snap(ids: &[u32]) -> Snapshot<u32> {
        Snapshot::new(ids.to_vec()).unwrap()
    }

    fn deferred() -> Reconciler<u32, ModelCollection<u32>> {
        Reconciler::new(
            ModelCollection::new(CompletionMode::Deferred),
            ReconcilerConfig::default(),
        )
    }

    fn finish(rec: &Reconciler<u32, ModelCollection<u32>>) -> bool {
        rec.with_collection(ModelCollection::finish_pending)
            .unwrap_or(false)
    }

    fn shown(rec: &Reconciler<u32, ModelCollection<u32>>) -> Vec<u32> {
        rec.with_collection(|host| host.items().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn immediate_host_applies_synchronously() {
        let rec = Reconciler::new(ModelCollection::default(), ReconcilerConfig::default());
        assert_eq!(rec.apply(snap(&[1, 2, 3])), ApplyOutcome::Started(SessionId(1)));
        assert!(!rec.is_busy());
        assert_eq!(shown(&rec), vec![1, 2, 3]);
        assert_eq!(rec.last_applied().items(), &[1, 2, 3]);
        assert_eq!(rec.stats().sessions_completed, 1);
    }

    #[test]
    fn unchanged_snapshot_skips_host() {
        let rec = Reconciler::new(ModelCollection::default(), ReconcilerConfig::default());
        rec.apply(snap(&[1, 2]));
        assert_eq!(rec.apply(snap(&[1, 2])), ApplyOutcome::Unchanged);
        assert_eq!(rec.apply(snap(&[])), ApplyOutcome::Started(SessionId(2)));
        assert_eq!(rec.apply(snap(&[])), ApplyOutcome::Unchanged);

        let batches = rec.with_collection(|host| host.batches().len()).unwrap();
        assert_eq!(batches, 2);
        assert_eq!(rec.stats().unchanged_skipped, 2);
    }

    #[test]
    fn empty_initial_publication_is_a_no_op() {
        let rec = deferred();
        assert_eq!(rec.apply(snap(&[])), ApplyOutcome::Unchanged);
        assert!(!rec.is_busy());
    }

    #[test]
    fn snapshots_queue_while_in_flight_and_latest_wins() {
        let rec = deferred();
        assert!(matches!(rec.apply(snap(&[1])), ApplyOutcome::Started(_)));
        assert!(rec.is_busy());

        assert_eq!(rec.apply(snap(&[1, 2])), ApplyOutcome::Queued { superseded: false });
        assert_eq!(rec.apply(snap(&[1, 2, 3])), ApplyOutcome::Queued { superseded: true });
        assert_eq!(rec.apply(snap(&[3, 1])), ApplyOutcome::Queued { superseded: true });
        assert_eq!(rec.stats().snapshots_coalesced, 2);

        assert!(finish(&rec));
        // The queued snapshot started right away.
        assert_eq!(rec.current_session(), Some(SessionId(2)));
        assert!(finish(&rec));
        assert!(!rec.is_busy());
        assert_eq!(shown(&rec), vec![3, 1]);
        assert_eq!(rec.stats().sessions_started, 2);
    }

    #[test]
    fn queued_snapshot_equal_to_target_is_skipped() {
        let rec = deferred();
        rec.apply(snap(&[1, 2]));
        rec.apply(snap(&[1, 2]));
        assert!(finish(&rec));
        assert!(!rec.is_busy());
        assert_eq!(rec.stats().unchanged_skipped, 1);
        assert_eq!(rec.stats().sessions_started, 1);
    }

    #[test]
    fn failure_resyncs_from_host_and_drops_queue() {
        let rec = deferred();
        rec.apply(snap(&[1, 2]));
        assert!(finish(&rec));

        let errors = Rc::new(Cell::new(0));
        let counter = Rc::clone(&errors);
        rec.on_error(move |err| {
            assert_eq!(err.session(), SessionId(2));
            counter.set(counter.get() + 1);
        });

        rec.with_collection(|host| host.fail_next(CollectionError::Host("gone".into())));
        rec.apply(snap(&[2, 1]));
        // Failed synchronously inside apply; nothing is left in flight.
        assert!(!rec.is_busy());
        assert_eq!(errors.get(), 1);
        assert_eq!(rec.stats().sessions_failed, 1);
        assert_eq!(rec.last_applied().items(), &[1, 2]);
        assert!(matches!(
            rec.last_error(),
            Some(ReconcileError::Failed {
                source: CollectionError::Host(_),
                ..
            })
        ));
    }

    #[test]
    fn failure_discards_queued_snapshot() {
        let rec = deferred();
        rec.apply(snap(&[1]));
        rec.apply(snap(&[1, 2]));
        assert!(rec.has_queued());

        let pending = rec.with_collection(ModelCollection::take_pending).flatten();
        pending
            .expect("deferred completion")
            .failed(CollectionError::Host("animation interrupted".into()));

        assert!(!rec.has_queued());
        assert!(!rec.is_busy());
        assert_eq!(rec.stats().sessions_started, 1);
    }

    #[test]
    fn failure_without_observed_state_assumes_attempted_snapshot() {
        let config = ReconcilerConfig {
            recover_from_observed_state: false,
            ..ReconcilerConfig::default()
        };
        let rec = Reconciler::new(ModelCollection::default(), config);
        rec.with_collection(|host| host.fail_next(CollectionError::Host("x".into())));
        rec.apply(snap(&[4, 5]));
        assert_eq!(rec.last_applied().items(), &[4, 5]);
        assert!(rec.last_error().is_some());
    }

    #[test]
    fn identity_instability_fails_the_session() {
        let rec = Reconciler::new(ModelCollection::default(), ReconcilerConfig::default());
        rec.apply(snap(&[1, 2, 3]));
        // The host silently shows something else.
        rec.with_collection(|host| host.force_items(vec![9, 2, 3]));
        rec.apply(snap(&[2, 3]));

        let err = rec.last_error().expect("failure recorded");
        let ReconcileError::Failed { source, .. } = err;
        assert!(source.is_identity_instability());
        assert!(matches!(
            source,
            CollectionError::Apply(ApplyError::UnknownIdentity { .. })
        ));
        // Resynced to what the host actually shows.
        assert_eq!(rec.last_applied().items(), &[9, 2, 3]);

        // The next publication converges on the desired state.
        rec.apply(snap(&[2, 3]));
        assert_eq!(shown(&rec), vec![2, 3]);
    }

    #[test]
    fn abandoned_completion_fails_session() {
        let rec = deferred();
        rec.apply(snap(&[1]));
        let pending = rec.with_collection(ModelCollection::take_pending).flatten();
        drop(pending);
        assert!(!rec.is_busy());
        assert_eq!(
            rec.last_error().map(|e| {
                let ReconcileError::Failed { source, .. } = e;
                source
            }),
            Some(CollectionError::Abandoned)
        );
    }

    #[test]
    fn stale_completion_is_ignored() {
        let rec = deferred();
        rec.apply(snap(&[1]));
        let first = rec
            .with_collection(ModelCollection::take_pending)
            .flatten()
            .unwrap();
        first.finished();
        rec.apply(snap(&[1, 2]));
        assert_eq!(rec.current_session(), Some(SessionId(2)));

        // Late signal for session #1.
        let sink: Weak<dyn CompletionSink> = Rc::downgrade(&rec.shared) as Weak<dyn CompletionSink>;
        Completion::new(sink, SessionId(1)).finished();
        assert_eq!(rec.current_session(), Some(SessionId(2)));
    }

    #[test]
    fn teardown_makes_late_completion_a_no_op() {
        let rec = deferred();
        rec.apply(snap(&[1, 2]));
        let pending = rec
            .with_collection(ModelCollection::take_pending)
            .flatten()
            .unwrap();
        rec.apply(snap(&[3]));

        rec.teardown();
        assert!(!rec.is_alive());
        assert!(!rec.has_queued());
        assert!(rec.with_collection(|host| host.items().len()).is_none());

        pending.finished();
        assert_eq!(rec.stats().sessions_completed, 0);
        assert_eq!(rec.apply(snap(&[5])), ApplyOutcome::Closed);
    }

    struct DropFlagged {
        inner: ModelCollection<u32>,
        dropped: Rc<Cell<bool>>,
    }

    impl VisualCollection<u32> for DropFlagged {
        fn apply(&mut self, batch: Batch<u32>, completion: Completion) {
            self.inner.apply(batch, completion);
        }
    }

    impl Drop for DropFlagged {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    #[test]
    fn teardown_inside_host_borrow_releases_host_afterwards() {
        let dropped = Rc::new(Cell::new(false));
        let rec = Reconciler::new(
            DropFlagged {
                inner: ModelCollection::new(CompletionMode::Deferred),
                dropped: Rc::clone(&dropped),
            },
            ReconcilerConfig::default(),
        );
        rec.apply(snap(&[1]));
        assert!(rec.with_collection(|host| host.inner.has_pending()).unwrap());

        let inner = rec.clone();
        let ran = rec.with_collection(move |host| {
            inner.teardown();
            // Still borrowed here; released once the closure returns.
            host.inner.items().to_vec()
        });
        assert_eq!(ran, Some(vec![1]));
        assert!(dropped.get());
        assert!(!rec.is_alive());
        assert!(rec.with_collection(|host| host.inner.items().len()).is_none());
        assert_eq!(rec.stats().sessions_completed, 0);
    }

    #[test]
    fn elapsed_micros_saturate() {
        assert_eq!(micros(Duration::from_micros(1_500)), 1_500);
        assert_eq!(micros(Duration::MAX), u64::MAX);
    }

    #[test]
    fn apply_while_host_borrowed_waits_for_release() {
        let rec = Reconciler::new(ModelCollection::default(), ReconcilerConfig::default());
        let inner = rec.clone();
        let outcome = rec.with_collection(move |_| inner.apply(snap(&[7])));
        assert_eq!(outcome, Some(ApplyOutcome::Queued { superseded: false }));
        // Released: the queued snapshot has been applied.
        assert_eq!(shown(&rec), vec![7]);
    }
}
