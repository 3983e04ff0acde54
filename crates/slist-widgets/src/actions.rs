#![forbid(unsafe_code)]

//! Row-to-owner event channel.
//!
//! Rows report user interaction upward as [`RowEvent`]s. The data owner
//! subscribes, performs the mutation on its own item sequence, and
//! republishes; rows never touch the list directly.
//!
//! The channel is a latest-value [`Observable`], but subscribers only see
//! events emitted after they subscribed. Replaying an old "remove" to a late
//! subscriber would repeat the mutation.

use std::cell::Cell;
use std::fmt;

use slist_runtime::{Observable, Subscription};

/// Something a row asked its owner to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent<K> {
    /// A row control was activated for the item with identity `key`.
    ActionRequested { key: K, action: &'static str },
    /// The row at `position` was selected.
    Selected { key: K, position: usize },
}

impl<K> RowEvent<K> {
    /// Identity the event refers to.
    #[must_use]
    pub fn key(&self) -> &K {
        match self {
            Self::ActionRequested { key, .. } | Self::Selected { key, .. } => key,
        }
    }
}

/// Shared handle to a row event channel.
pub struct RowActions<K> {
    channel: Observable<RowEvent<K>>,
}

impl<K> Clone for RowActions<K> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<K> Default for RowActions<K> {
    fn default() -> Self {
        Self {
            channel: Observable::empty(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for RowActions<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowActions")
            .field("emitted", &self.channel.version())
            .field("subscribers", &self.channel.subscriber_count())
            .finish()
    }
}

impl<K: Clone + 'static> RowActions<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to current subscribers.
    pub fn emit(&self, event: RowEvent<K>) {
        self.channel.set(event);
    }

    /// Emit [`RowEvent::ActionRequested`].
    pub fn request(&self, key: K, action: &'static str) {
        self.emit(RowEvent::ActionRequested { key, action });
    }

    /// Listen for events emitted from now on.
    pub fn subscribe(&self, callback: impl Fn(&RowEvent<K>) + 'static) -> Subscription {
        let skip_replay = Cell::new(self.channel.has_value());
        self.channel.subscribe(move |event| {
            if skip_replay.replace(false) {
                return;
            }
            callback(event);
        })
    }

    /// A control bound to `key` that requests `action` when pressed.
    #[must_use]
    pub fn button(&self, key: K, action: &'static str) -> ActionButton<K> {
        ActionButton {
            key,
            action,
            actions: self.clone(),
        }
    }

    /// Most recent event.
    #[must_use]
    pub fn last(&self) -> Option<RowEvent<K>> {
        self.channel.get()
    }

    /// Events emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.channel.version()
    }
}

/// A row control wired to one identity and one action.
pub struct ActionButton<K> {
    key: K,
    action: &'static str,
    actions: RowActions<K>,
}

impl<K: Clone> Clone for ActionButton<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            action: self.action,
            actions: self.actions.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for ActionButton<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionButton")
            .field("key", &self.key)
            .field("action", &self.action)
            .finish()
    }
}

impl<K: Clone + 'static> ActionButton<K> {
    /// Emit the bound action.
    pub fn press(&self) {
        self.actions.request(self.key.clone(), self.action);
    }

    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub fn action(&self) -> &'static str {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(actions: &RowActions<u32>) -> (Rc<RefCell<Vec<RowEvent<u32>>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = actions.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        (seen, sub)
    }

    #[test]
    fn button_press_reaches_subscriber() {
        let actions = RowActions::new();
        let (seen, _sub) = recorder(&actions);

        actions.button(7, "remove").press();
        assert_eq!(*seen.borrow(), vec![RowEvent::ActionRequested {
            key: 7,
            action: "remove"
        }]);
        assert_eq!(actions.emitted(), 1);
    }

    #[test]
    fn late_subscriber_does_not_see_old_events() {
        let actions = RowActions::new();
        actions.request(1, "remove");

        let (seen, _sub) = recorder(&actions);
        assert!(seen.borrow().is_empty());

        actions.emit(RowEvent::Selected { key: 2, position: 0 });
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].key(), &2);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let actions = RowActions::new();
        let (seen, sub) = recorder(&actions);
        drop(sub);
        actions.request(3, "remove");
        assert!(seen.borrow().is_empty());
        assert_eq!(
            actions.last(),
            Some(RowEvent::ActionRequested {
                key: 3,
                action: "remove"
            })
        );
    }
}
