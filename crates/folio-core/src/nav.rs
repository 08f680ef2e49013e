//! Soft-navigation fan-out.
//!
//! The host page announces "about to swap documents" with a single event.
//! [`NavigationHub`] subscribes to it once for the whole page and fans it out
//! to whichever sessions are mounted, so repeated mounts never stack up
//! duplicate subscriptions.

use std::rc::Rc;

/// Handle returned by [`NavigationHub::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn()>;

/// Page-wide registry of navigation-start listeners.
///
/// `S` is whatever keeps the underlying subscription alive.
pub struct NavigationHub<S> {
    subscription: Option<S>,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl<S> Default for NavigationHub<S> {
    fn default() -> Self {
        Self {
            subscription: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<S> NavigationHub<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe if not already subscribed. `subscribe` runs at most once per
    /// successful subscription; returning `None` leaves the hub unsubscribed
    /// so a later call can retry.
    pub fn ensure_subscribed(&mut self, subscribe: impl FnOnce() -> Option<S>) {
        if self.subscription.is_none() {
            self.subscription = subscribe();
        }
    }

    pub fn register(&mut self, listener: impl Fn() + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot of the current listeners. Dispatch iterates the snapshot so a
    /// listener may unregister itself (or others) while being called.
    pub fn listeners(&self) -> Vec<Rc<dyn Fn()>> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_subscribes_once() {
        let mut hub: NavigationHub<&'static str> = NavigationHub::new();
        let calls = Cell::new(0);
        for _ in 0..3 {
            hub.ensure_subscribed(|| {
                calls.set(calls.get() + 1);
                Some("subscription")
            });
        }
        assert_eq!(calls.get(), 1);
        assert!(hub.is_subscribed());
    }

    #[test]
    fn test_failed_subscribe_retries() {
        let mut hub: NavigationHub<()> = NavigationHub::new();
        hub.ensure_subscribed(|| None);
        assert!(!hub.is_subscribed());
        hub.ensure_subscribed(|| Some(()));
        assert!(hub.is_subscribed());
    }

    #[test]
    fn test_dispatch_tolerates_unregister() {
        let hub: Rc<RefCell<NavigationHub<()>>> = Rc::default();
        let fired = Rc::new(Cell::new(0));

        let id_slot = Rc::new(Cell::new(None));
        let first = {
            let inner = hub.clone();
            let fired = fired.clone();
            let id_slot = id_slot.clone();
            let listener = move || {
                fired.set(fired.get() + 1);
                if let Some(id) = id_slot.get() {
                    inner.borrow_mut().unregister(id);
                }
            };
            hub.borrow_mut().register(listener)
        };
        id_slot.set(Some(first));
        {
            let fired = fired.clone();
            hub.borrow_mut().register(move || fired.set(fired.get() + 10));
        }

        let snapshot = hub.borrow().listeners();
        for listener in snapshot {
            listener();
        }
        assert_eq!(fired.get(), 11);
        assert_eq!(hub.borrow().len(), 1);
        assert!(!hub.borrow_mut().unregister(first));
    }
}
