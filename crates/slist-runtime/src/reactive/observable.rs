#![forbid(unsafe_code)]

//! Single-slot observable with replay-on-subscribe.
//!
//! # Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use slist_runtime::reactive::Observable;
//!
//! let items = Observable::new(vec![1, 2, 3]);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&seen);
//! let sub = items.subscribe(move |v: &Vec<i32>| sink.borrow_mut().push(v.len()));
//! // Replay of the current value.
//! assert_eq!(*seen.borrow(), vec![3]);
//!
//! items.set(vec![1]);
//! assert_eq!(*seen.borrow(), vec![3, 1]);
//!
//! drop(sub);
//! items.set(vec![]);
//! assert_eq!(*seen.borrow(), vec![3, 1]);
//! ```
//!
//! # Failure Modes
//!
//! - Callback panic: propagates to the caller of `set()`; the slot already
//!   holds the new value.
//! - Observable dropped while subscriptions are alive: the subscriptions stay
//!   valid and simply never fire again.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Callback<T> {
    f: Box<dyn Fn(&T)>,
}

struct Inner<T> {
    value: Option<Rc<T>>,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, version-tracked, latest-value slot.
///
/// Cloning yields another handle to the same slot.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value.as_deref())
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: 'static> Observable<T> {
    /// Create a slot holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: Some(Rc::new(value)),
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Publish a new value and notify subscribers.
    pub fn set(&self, value: T) {
        let (value, version, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let value = Rc::new(value);
            inner.value = Some(Rc::clone(&value));
            inner.version += 1;
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (value, inner.version, callbacks)
        };

        for callback in callbacks {
            if self.inner.borrow().version != version {
                // A callback republished; the newer value already went out.
                break;
            }
            (callback.f)(&value);
        }
    }

    /// Replace the value with a modified copy and publish it.
    ///
    /// Does nothing when the slot is empty.
    pub fn modify(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        let Some(mut next) = self.get() else {
            return;
        };
        f(&mut next);
        self.set(next);
    }

    /// Register `callback`, replaying the current value to it immediately.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] lives.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback = Rc::new(Callback {
            f: Box::new(callback),
        });
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&callback));
            inner.value.clone()
        };
        if let Some(value) = current {
            (callback.f)(&value);
        }
        Subscription {
            guard: Some(callback),
        }
    }
}

impl<T> Observable<T> {
    /// Create an empty slot. Subscribers get nothing until the first `set`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: None,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.borrow().value.as_deref().cloned()
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let value = self.inner.borrow().value.clone();
        f(value.as_deref())
    }

    /// Number of `set` calls so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Whether the slot has ever been given a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard for an [`Observable`] subscription.
///
/// Dropping the guard (or calling [`unsubscribe`](Self::unsubscribe))
/// releases the callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Rc<dyn Any>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Release the callback now.
    pub fn unsubscribe(mut self) {
        self.guard = None;
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}
