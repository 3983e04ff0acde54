#![forbid(unsafe_code)]

//! Latest-value publication primitives.
//!
//! - [`Observable`]: a shared single-slot value with a version counter and
//!   push notification to subscribers.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership, matching the rule that list data is published and consumed on
//! the UI context. Subscribers are stored as `Weak` callbacks and cleaned up
//! lazily during notification; the [`Subscription`] owns the only strong
//! reference.
//!
//! # Invariants
//!
//! 1. The slot holds at most one value; each `set` replaces it and bumps the
//!    version by exactly one.
//! 2. A new subscriber immediately receives the current value, if any.
//! 3. Subscribers are notified in registration order.
//! 4. A publish made from inside a callback supersedes the one in progress:
//!    remaining subscribers only see the newer value.
//! 5. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod observable;

pub use observable::{Observable, Subscription};
