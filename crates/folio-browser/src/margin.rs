//! Desktop margin notes.
//!
//! Each layout pass reads every anchor's geometry, hands the snapshot to
//! [`compute_layout`] and then rebuilds both panel layers in one go. Panels
//! are never diffed. Anything that can move anchors (window or container
//! resize, late images, web fonts) requests a pass through the scheduler, so
//! a burst of triggers costs one pass on the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{
    AnchorSnapshot, LayoutScheduler, MarginLayout, MarginNotes, NoteId, NoteStrategy, Schedule,
    Side, compute_layout,
};
use gloo_events::{EventListener, EventListenerOptions};
use gloo_render::{AnimationFrame, request_animation_frame};
use js_sys::{Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, HtmlElement, HtmlImageElement};

use crate::dom::{
    closest, create_element, event_element, host_error, query, query_all, set_style, toggle_class,
};

const VISIBLE: &str = "margin-note--visible";

// === ResizeObserver binding ===
//
// Bound by hand so the crate doesn't depend on web-sys's unstable APIs.

#[wasm_bindgen]
extern "C" {
    /// Observer that reports size changes of observed elements.
    pub type ResizeObserver;

    #[wasm_bindgen(constructor, catch)]
    pub fn new(callback: &js_sys::Function) -> Result<ResizeObserver, JsValue>;

    #[wasm_bindgen(method)]
    pub fn observe(this: &ResizeObserver, target: &Element);

    #[wasm_bindgen(method)]
    pub fn disconnect(this: &ResizeObserver);
}

struct DesktopState {
    container: HtmlElement,
    left: HtmlElement,
    right: HtmlElement,
    notes: RefCell<MarginNotes>,
    layout: RefCell<MarginLayout>,
    scheduler: RefCell<LayoutScheduler>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl DesktopState {
    fn layer(&self, side: Side) -> &HtmlElement {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn layout_pass(&self) {
        // Late frame after the container left the page.
        if !self.container.is_connected() {
            tracing::trace!("skipping margin layout for detached container");
            return;
        }

        // Read.
        let container_top = self.container.get_bounding_client_rect().top();
        let mut anchors = Vec::new();
        let mut snapshots = Vec::new();
        for anchor in query_all(&self.container, ".footnote") {
            let (Some(text), Some(note)) = (
                query(&anchor, ".footnote-text"),
                query(&anchor, ".footnote-note"),
            ) else {
                continue;
            };
            snapshots.push(AnchorSnapshot {
                text: text.text_content().unwrap_or_default(),
                note_html: note.inner_html(),
                top: text.get_bounding_client_rect().top() - container_top,
            });
            anchors.push(anchor);
        }

        let layout = compute_layout(&snapshots);

        // Write.
        self.left.set_inner_html("");
        self.right.set_inner_html("");
        for placement in &layout.placements {
            let class = format!("margin-note margin-note--{}", placement.side.as_str());
            let Some(panel) = create_element("div", &class) else {
                continue;
            };
            panel.set_inner_html(&placement.note_html);
            let _ = panel.set_attribute("data-footnote-id", &placement.id);
            set_style(&panel, "top", &format!("{}px", placement.top));
            let _ = self.layer(placement.side).append_child(&panel);

            if let Some(anchor) = anchors.get(placement.anchor) {
                let _ = anchor.set_attribute("data-footnote-id", &placement.id);
                if let Some(anchor) = anchor.dyn_ref::<HtmlElement>() {
                    set_style(anchor, "cursor", "pointer");
                }
            }
        }

        let active = self.notes.borrow().after_layout(&layout).cloned();
        if let Some(id) = active {
            self.show(&id);
        }
        tracing::trace!(notes = layout.placements.len(), "margin layout pass");
        *self.layout.borrow_mut() = layout;
    }

    fn panel(&self, id: &str) -> Option<Element> {
        query(
            &self.container,
            &format!(".margin-note[data-footnote-id=\"{id}\"]"),
        )
    }

    fn show(&self, id: &str) {
        if let Some(panel) = self.panel(id) {
            toggle_class(&panel, VISIBLE, true);
        }
    }

    fn hide_all(&self) {
        for panel in query_all(&self.container, &format!(".{VISIBLE}")) {
            toggle_class(&panel, VISIBLE, false);
        }
    }

    fn on_click(&self, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        let anchor = closest(&target, ".footnote").filter(|a| self.container.contains(Some(a)));
        let Some(anchor) = anchor else {
            self.hide_all();
            self.notes.borrow_mut().close();
            return;
        };

        event.prevent_default();
        event.stop_propagation();
        let Some(id) = anchor.get_attribute("data-footnote-id") else {
            return;
        };
        self.hide_all();
        let shown = {
            let layout = self.layout.borrow();
            self.notes.borrow_mut().toggle(&id, &layout).cloned()
        };
        if let Some(id) = shown {
            self.show(&id);
        }
    }
}

fn schedule(state: &Rc<DesktopState>) {
    if state.scheduler.borrow_mut().request() == Schedule::Stopped {
        return;
    }
    let weak = Rc::downgrade(state);
    let handle = request_animation_frame(move |_| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        state.frame.borrow_mut().take();
        let run = state.scheduler.borrow_mut().begin_pass();
        if run {
            state.layout_pass();
        }
    });
    // Replacing the handle cancels the frame it held.
    *state.frame.borrow_mut() = Some(handle);
}

fn fonts_ready() -> Option<Promise> {
    let document = web_sys::window()?.document()?;
    let fonts = Reflect::get(&document, &JsValue::from_str("fonts")).ok()?;
    if fonts.is_undefined() || fonts.is_null() {
        return None;
    }
    Reflect::get(&fonts, &JsValue::from_str("ready"))
        .ok()?
        .dyn_into::<Promise>()
        .ok()
}

fn find_or_create_layer(container: &HtmlElement, side: Side) -> Option<HtmlElement> {
    let modifier = format!("footnote-layer--{}", side.as_str());
    if let Some(existing) = query(container, &format!(".{modifier}")) {
        return existing.dyn_into::<HtmlElement>().ok();
    }
    let layer = create_element("div", &format!("footnote-layer {modifier}"))?;
    container.append_child(&layer).ok()?;
    Some(layer)
}

/// Desktop note mode for one container. Dropping it removes both layers and
/// detaches every trigger.
pub struct DesktopNotes {
    state: Rc<DesktopState>,
    observer: Option<ResizeObserver>,
    _observer_callback: Option<Closure<dyn FnMut(JsValue)>>,
    _listeners: Vec<EventListener>,
}

impl DesktopNotes {
    pub fn install(container: &HtmlElement) -> Option<Self> {
        let right = find_or_create_layer(container, Side::Right)?;
        let left = find_or_create_layer(container, Side::Left)?;
        let state = Rc::new(DesktopState {
            container: container.clone(),
            left,
            right,
            notes: RefCell::new(MarginNotes::new()),
            layout: RefCell::new(MarginLayout::default()),
            scheduler: RefCell::new(LayoutScheduler::default()),
            frame: RefCell::new(None),
        });

        state.layout_pass();

        let mut listeners = Vec::new();

        let weak = Rc::downgrade(&state);
        listeners.push(EventListener::new_with_options(
            container,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(state) = weak.upgrade() {
                    state.on_click(event);
                }
            },
        ));

        if let Some(window) = web_sys::window() {
            let weak = Rc::downgrade(&state);
            listeners.push(EventListener::new(&window, "resize", move |_| {
                if let Some(state) = weak.upgrade() {
                    schedule(&state);
                }
            }));
        }

        for img in query_all(container, "img") {
            let Ok(img) = img.dyn_into::<HtmlImageElement>() else {
                continue;
            };
            if img.complete() {
                continue;
            }
            for event in ["load", "error"] {
                let weak = Rc::downgrade(&state);
                listeners.push(EventListener::once(&img, event, move |_| {
                    if let Some(state) = weak.upgrade() {
                        schedule(&state);
                    }
                }));
            }
        }

        let weak = Rc::downgrade(&state);
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |_entries: JsValue| {
            if let Some(state) = weak.upgrade() {
                schedule(&state);
            }
        });
        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(container);
                Some(observer)
            }
            Err(err) => {
                tracing::warn!(
                    error = %host_error(err),
                    "ResizeObserver unavailable, container resizes won't relayout"
                );
                None
            }
        };

        if let Some(ready) = fonts_ready() {
            let weak = Rc::downgrade(&state);
            wasm_bindgen_futures::spawn_local(async move {
                if JsFuture::from(ready).await.is_err() {
                    return;
                }
                if let Some(state) = weak.upgrade() {
                    schedule(&state);
                }
            });
        }

        tracing::debug!(
            notes = state.layout.borrow().placements.len(),
            "desktop notes installed"
        );
        Some(Self {
            state,
            observer,
            _observer_callback: Some(callback),
            _listeners: listeners,
        })
    }

    /// Identity of the panel currently showing.
    pub fn active(&self) -> Option<NoteId> {
        let layout = self.state.layout.borrow();
        self.state.notes.borrow().after_layout(&layout).cloned()
    }

    /// Request a layout pass on the next frame.
    pub fn relayout(&self) {
        schedule(&self.state);
    }

    /// Run a layout pass right now.
    pub fn layout_now(&self) {
        self.state.layout_pass();
    }
}

impl Drop for DesktopNotes {
    fn drop(&mut self) {
        self.state.scheduler.borrow_mut().stop();
        self.state.frame.borrow_mut().take();
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.state.left.remove();
        self.state.right.remove();
        tracing::debug!("desktop notes torn down");
    }
}

/// Margin panels beside the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopStrategy;

impl NoteStrategy<HtmlElement> for DesktopStrategy {
    type Guard = Option<DesktopNotes>;

    fn install(&self, container: &HtmlElement) -> Self::Guard {
        DesktopNotes::install(container)
    }
}
