//! Page-wide navigation-start subscription.

use std::cell::RefCell;

use folio_core::{ListenerId, NavigationHub};
use gloo_events::EventListener;

thread_local! {
    static HUB: RefCell<NavigationHub<EventListener>> = RefCell::new(NavigationHub::new());
}

/// Keeps a navigation listener registered. Dropping it unregisters.
#[must_use]
pub struct NavigationRegistration {
    id: ListenerId,
}

/// Call `listener` whenever the page announces `event_name` on `document`.
///
/// The DOM subscription is made once per page. Its event name is whichever
/// the first caller asked for.
pub fn on_navigation_start(
    event_name: &str,
    listener: impl Fn() + 'static,
) -> NavigationRegistration {
    HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        hub.ensure_subscribed(|| subscribe(event_name));
        NavigationRegistration {
            id: hub.register(listener),
        }
    })
}

/// Number of registered listeners.
pub fn listener_count() -> usize {
    HUB.with(|hub| hub.borrow().len())
}

fn subscribe(event_name: &str) -> Option<EventListener> {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        tracing::warn!("no document to watch for navigation");
        return None;
    };
    tracing::debug!(event = event_name, "subscribed to navigation start");
    Some(EventListener::new(
        &document,
        event_name.to_string(),
        |_| dispatch(),
    ))
}

fn dispatch() {
    let listeners = HUB.with(|hub| hub.borrow().listeners());
    tracing::debug!(listeners = listeners.len(), "navigation starting");
    for listener in listeners {
        listener();
    }
}

impl Drop for NavigationRegistration {
    fn drop(&mut self) {
        let id = self.id;
        // The hub may already be gone during thread teardown.
        let _ = HUB.try_with(|hub| {
            if let Ok(mut hub) = hub.try_borrow_mut() {
                hub.unregister(id);
            }
        });
    }
}
