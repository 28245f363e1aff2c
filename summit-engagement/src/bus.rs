//! Single-threaded notification bus for engagement side effects.
//!
//! UI components subscribe here instead of reaching for a page-global
//! callback. Publishing runs every listener synchronously, in subscription
//! order. Hosts that let listeners touch the bus again can take
//! [`NotificationBus::handles`] and deliver without holding the bus.

use crate::event::Event;
use crate::progress::LevelUp;
use crate::rules::Unlock;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Externally observable engine effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    PointsAwarded { event: Event },
    LevelUp(LevelUp),
    AchievementUnlocked { unlock: Unlock },
}

/// Handle returned by [`NotificationBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Numeric form for handing across FFI boundaries.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

type Listener = Rc<RefCell<dyn FnMut(&Notification)>>;

/// Shared reference to one registered listener.
#[derive(Clone)]
pub struct ListenerHandle {
    id: SubscriptionId,
    listener: Listener,
}

impl ListenerHandle {
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Run the listener once. A listener that is already running further up
    /// the stack is skipped.
    pub fn deliver(&self, notification: &Notification) {
        if let Ok(mut listener) = self.listener.try_borrow_mut() {
            (&mut *listener)(notification);
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct NotificationBus {
    listeners: Vec<ListenerHandle>,
    next_id: u64,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NotificationBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Notification) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.listeners.push(ListenerHandle { id, listener });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|handle| handle.id != id);
        self.listeners.len() != before
    }

    pub fn publish(&self, notification: &Notification) {
        for handle in &self.listeners {
            handle.deliver(notification);
        }
    }

    /// Current listeners in subscription order.
    #[must_use]
    pub fn handles(&self) -> Vec<ListenerHandle> {
        self.listeners.clone()
    }

    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.listeners.iter().any(|handle| handle.id == id)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_receive_in_order_and_can_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();

        let first = {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push("first"))
        };
        {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push("second"));
        }

        let note = Notification::LevelUp(LevelUp { from: 1, to: 2 });
        bus.publish(&note);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        bus.publish(&note);
        assert_eq!(*seen.borrow(), vec!["first", "second", "second"]);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn handles_outlive_unsubscribe_and_report_membership() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = NotificationBus::new();
        let id = {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| *seen.borrow_mut() += 1)
        };
        let handles = bus.handles();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].id(), id);

        assert!(bus.unsubscribe(id));
        assert!(!bus.is_subscribed(id));
        handles[0].deliver(&Notification::LevelUp(LevelUp { from: 1, to: 2 }));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn publishing_without_listeners_is_a_noop() {
        let bus = NotificationBus::new();
        bus.publish(&Notification::LevelUp(LevelUp { from: 2, to: 3 }));
        assert_eq!(bus.listener_count(), 0);
    }
}
