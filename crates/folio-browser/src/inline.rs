//! Narrow-viewport notes: tapping an anchor expands its note inline.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{InlineChange, InlineToggle, NoteStrategy};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement};

use crate::dom::{closest, create_element, event_element, host_error, query, query_all, set_style};

struct MobileState {
    anchors: Vec<Element>,
    toggle: RefCell<InlineToggle>,
    expansion: RefCell<Option<Element>>,
}

impl MobileState {
    fn on_click(&self, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        let index = closest(&target, ".footnote")
            .and_then(|anchor| self.anchors.iter().position(|a| *a == anchor));
        if let Some(index) = index {
            event.prevent_default();
            event.stop_propagation();
            let changes = self.toggle.borrow_mut().click_anchor(index);
            self.apply(&changes);
            return;
        }
        if closest(&target, ".inline-footnote").is_some() {
            return;
        }
        let change = self.toggle.borrow_mut().click_outside();
        if let Some(change) = change {
            self.apply(&[change]);
        }
    }

    fn apply(&self, changes: &[InlineChange]) {
        for change in changes {
            match *change {
                InlineChange::Collapse(_) => self.collapse(),
                InlineChange::Expand(index) => self.expand(index),
            }
        }
    }

    fn collapse(&self) {
        if let Some(expansion) = self.expansion.borrow_mut().take() {
            expansion.remove();
        }
    }

    fn expand(&self, index: usize) {
        let Some(anchor) = self.anchors.get(index) else {
            return;
        };
        let Some(note) = query(anchor, ".footnote-note") else {
            return;
        };
        let Some(expansion) = create_element("span", "inline-footnote") else {
            return;
        };
        expansion.set_inner_html(&note.inner_html());
        match anchor.insert_adjacent_element("afterend", &expansion) {
            Ok(_) => *self.expansion.borrow_mut() = Some(expansion.into()),
            Err(err) => tracing::warn!(error = %host_error(err), "failed to insert inline note"),
        }
    }
}

/// Mobile note mode for one container. Dropping it collapses any open note
/// and detaches the click handler.
pub struct MobileNotes {
    state: Rc<MobileState>,
    _click: EventListener,
}

impl MobileNotes {
    pub fn install(container: &HtmlElement) -> Self {
        let anchors: Vec<Element> = query_all(container, ".footnote")
            .into_iter()
            .filter(|anchor| query(anchor, ".footnote-note").is_some())
            .collect();
        for anchor in &anchors {
            if let Some(anchor) = anchor.dyn_ref::<HtmlElement>() {
                set_style(anchor, "cursor", "pointer");
            }
        }

        let state = Rc::new(MobileState {
            anchors,
            toggle: RefCell::new(InlineToggle::default()),
            expansion: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        let click = EventListener::new_with_options(
            container,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(state) = weak.upgrade() {
                    state.on_click(event);
                }
            },
        );

        tracing::debug!(anchors = state.anchors.len(), "mobile notes installed");
        Self {
            state,
            _click: click,
        }
    }

    /// Index of the anchor whose note is expanded.
    pub fn open_anchor(&self) -> Option<usize> {
        self.state.toggle.borrow().open_anchor()
    }
}

impl Drop for MobileNotes {
    fn drop(&mut self) {
        self.state.collapse();
        tracing::debug!("mobile notes torn down");
    }
}

/// Notes expand in the text flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobileStrategy;

impl NoteStrategy<HtmlElement> for MobileStrategy {
    type Guard = MobileNotes;

    fn install(&self, container: &HtmlElement) -> Self::Guard {
        MobileNotes::install(container)
    }
}
