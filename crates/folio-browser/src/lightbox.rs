//! Page lightbox overlay and the container zoom handler.
//!
//! The overlay element is shared page-wide: it is looked up by class on first
//! open and only created if no one else has made it yet. [`SharedLightbox`]
//! is a cheap handle to the open/closed state driving it.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{Lightbox, LightboxCommand, Viewport, ZoomCandidate, qualifies_for_lightbox};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlElement, HtmlImageElement};

use crate::dom::{clear_style, closest, create_element, event_element, has_class, query, set_style, toggle_class};
use crate::preload::preload;

const OPEN: &str = "is-open";
const OVERLAY_MARKUP: &str = r#"<div class="pt-lightbox__backdrop"></div><div class="pt-lightbox__content"><img class="pt-lightbox__img" alt=""><div class="pt-lightbox__caption"></div></div>"#;
const BODY_LOCK: [(&str, &str); 4] = [("position", "fixed"), ("left", "0"), ("right", "0"), ("width", "100%")];

struct Overlay {
    root: HtmlElement,
    backdrop: Option<HtmlElement>,
    img: HtmlImageElement,
    caption: Option<HtmlElement>,
    _click: EventListener,
}

struct LightboxInner {
    machine: RefCell<Lightbox>,
    overlay: RefCell<Option<Overlay>>,
}

/// Handle to the page lightbox. Clones share state.
#[derive(Clone)]
pub struct SharedLightbox {
    inner: Rc<LightboxInner>,
}

thread_local! {
    static PAGE_LIGHTBOX: SharedLightbox = SharedLightbox::new();
}

impl Default for SharedLightbox {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedLightbox {
    /// A fresh handle with its own state. Most callers want [`Self::for_page`].
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LightboxInner {
                machine: RefCell::new(Lightbox::new()),
                overlay: RefCell::new(None),
            }),
        }
    }

    /// The handle every surface on this page shares by default.
    pub fn for_page() -> Self {
        PAGE_LIGHTBOX.with(Clone::clone)
    }

    pub fn is_open(&self) -> bool {
        self.inner.machine.borrow().is_open()
    }

    pub fn current_src(&self) -> Option<String> {
        self.inner.machine.borrow().current_src().map(str::to_string)
    }

    pub fn open(&self, src: &str, alt: &str, caption: &str) {
        let scroll_y = web_sys::window()
            .and_then(|window| window.scroll_y().ok())
            .unwrap_or(0.0);
        let commands = self.inner.machine.borrow_mut().open(src, alt, caption, scroll_y);
        self.execute(commands);
    }

    pub fn close(&self) {
        let commands = self.inner.machine.borrow_mut().close();
        self.execute(commands);
    }

    fn execute(&self, commands: Vec<LightboxCommand>) {
        for command in commands {
            match command {
                LightboxCommand::LockScroll { y } => {
                    let Some(body) = body() else { continue };
                    for (property, value) in BODY_LOCK {
                        set_style(&body, property, value);
                    }
                    set_style(&body, "top", &format!("-{y}px"));
                }
                LightboxCommand::Show { src, alt, caption } => {
                    if !self.ensure_overlay() {
                        continue;
                    }
                    let overlay = self.inner.overlay.borrow();
                    let Some(overlay) = overlay.as_ref() else { continue };
                    overlay.img.set_src(&src);
                    overlay.img.set_alt(&alt);
                    toggle_class(&overlay.img, "is-horizontal", false);
                    toggle_class(&overlay.img, "is-vertical", false);
                    if let Some(label) = &overlay.caption {
                        label.set_text_content(Some(&caption));
                        let display = if caption.is_empty() { "none" } else { "block" };
                        set_style(label, "display", display);
                    }
                    toggle_class(&overlay.root, OPEN, true);
                }
                LightboxCommand::ProbeOrientation { src } => {
                    let weak = Rc::downgrade(&self.inner);
                    wasm_bindgen_futures::spawn_local(async move {
                        let Ok(size) = preload(&src).await else {
                            return;
                        };
                        let Some(inner) = weak.upgrade() else {
                            return;
                        };
                        let Some(orientation) = inner.machine.borrow().orientation(&src, size) else {
                            tracing::trace!(src = %src, "orientation probe outlived its image");
                            return;
                        };
                        if let Some(overlay) = inner.overlay.borrow().as_ref() {
                            toggle_class(&overlay.img, orientation.class(), true);
                        }
                    });
                }
                LightboxCommand::Hide => {
                    let overlay = self.inner.overlay.borrow();
                    let Some(overlay) = overlay.as_ref() else { continue };
                    toggle_class(&overlay.root, OPEN, false);
                    overlay.img.set_src("");
                    if let Some(label) = &overlay.caption {
                        label.set_text_content(Some(""));
                    }
                }
                LightboxCommand::UnlockScroll { y } => {
                    if let Some(body) = body() {
                        for (property, _) in BODY_LOCK {
                            clear_style(&body, property);
                        }
                        clear_style(&body, "top");
                    }
                    if let Some(window) = web_sys::window() {
                        window.scroll_to_with_x_and_y(0.0, y);
                    }
                }
            }
        }
    }

    /// Find or build the overlay. Returns whether one is available.
    fn ensure_overlay(&self) -> bool {
        if self.inner.overlay.borrow().is_some() {
            return true;
        }
        let Some(body) = body() else {
            tracing::warn!("no document body for the lightbox overlay");
            return false;
        };
        let root = match query(&body, ".pt-lightbox") {
            Some(existing) => existing.dyn_into::<HtmlElement>().ok(),
            None => create_element("div", "pt-lightbox").and_then(|root| {
                root.set_inner_html(OVERLAY_MARKUP);
                body.append_child(&root).ok()?;
                Some(root)
            }),
        };
        let Some(root) = root else {
            return false;
        };
        let Some(img) = query(&root, ".pt-lightbox__img")
            .and_then(|img| img.dyn_into::<HtmlImageElement>().ok())
        else {
            tracing::warn!("lightbox overlay has no image");
            return false;
        };
        let backdrop = query(&root, ".pt-lightbox__backdrop").and_then(|el| el.dyn_into().ok());
        let caption = query(&root, ".pt-lightbox__caption").and_then(|el| el.dyn_into().ok());

        let weak = Rc::downgrade(&self.inner);
        let click = EventListener::new(&root, "click", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let hit = {
                let overlay = inner.overlay.borrow();
                let Some(overlay) = overlay.as_ref() else {
                    return;
                };
                let Some(target) = event.target() else {
                    return;
                };
                is_target(&target, &overlay.img)
                    || overlay
                        .backdrop
                        .as_ref()
                        .is_some_and(|backdrop| is_target(&target, backdrop))
            };
            if hit {
                SharedLightbox { inner }.close();
            }
        });

        tracing::debug!("lightbox overlay ready");
        *self.inner.overlay.borrow_mut() = Some(Overlay {
            root,
            backdrop,
            img,
            caption,
            _click: click,
        });
        true
    }
}

fn is_target(target: &EventTarget, element: &Element) -> bool {
    let element: &EventTarget = element.as_ref();
    target == element
}

fn body() -> Option<HtmlElement> {
    web_sys::window()?.document()?.body()
}

fn viewport_is_narrow(viewport: Viewport) -> bool {
    let window = match web_sys::window() {
        Some(window) => window,
        None => return false,
    };
    if let Ok(Some(query)) = window.match_media(&viewport.media_query()) {
        return query.matches();
    }
    window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .is_some_and(|width| viewport.is_narrow(width))
}

fn on_zoom_click(container: &HtmlElement, lightbox: &SharedLightbox, viewport: Viewport, event: &Event) {
    let Some(target) = event_element(event) else {
        return;
    };
    let Some(img) = closest(&target, "img") else {
        return;
    };
    let candidate = ZoomCandidate {
        inside_container: container.contains(Some(&img)),
        inside_carousel: closest(&target, ".pt-carousel-wrap").is_some(),
        is_carousel_slot: has_class(&img, "pt-carousel-img"),
        is_icon_glyph: has_class(&img, "material-symbols-outlined"),
        inside_footnote: closest(&img, ".footnote").is_some(),
    };
    if !qualifies_for_lightbox(&candidate, viewport_is_narrow(viewport)) {
        return;
    }
    let Ok(img) = img.dyn_into::<HtmlImageElement>() else {
        return;
    };

    if closest(&img, "a").is_some() {
        event.prevent_default();
        event.stop_propagation();
    }

    let src = match img.current_src() {
        current if !current.is_empty() => current,
        _ => img.src(),
    };
    let caption = img
        .get_attribute("data-caption")
        .filter(|caption| !caption.is_empty())
        .or_else(|| {
            let figure = closest(&img, "figure")?;
            let text = query(&figure, "figcaption")?.text_content()?;
            Some(text.trim().to_string())
        })
        .unwrap_or_default();
    lightbox.open(&src, &img.alt(), &caption);
}

/// Zoom handler on one container. Dropping it detaches the handler but
/// leaves the overlay in place for other surfaces.
pub struct LightboxBinding {
    _click: EventListener,
}

impl LightboxBinding {
    pub fn bind(container: &HtmlElement, lightbox: SharedLightbox, viewport: Viewport) -> Self {
        let target = container.clone();
        let click = EventListener::new_with_options(
            container,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| on_zoom_click(&target, &lightbox, viewport, event),
        );
        Self { _click: click }
    }
}
