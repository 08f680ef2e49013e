//! Carousel binding: drives a [`Carousel`] against its two slot images.
//!
//! The binding owns the machine, the pending animation frame and cooldown
//! timer. Async preloads only hold a weak reference, so completions that land
//! after the binding is dropped find nothing to update.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{Carousel, CarouselCommand, CarouselItem, Fit, FolioConfig};
use gloo_events::EventListener;
use gloo_render::{AnimationFrame, request_animation_frame};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlImageElement};

use crate::dom::{query, query_all, set_style, toggle_class};
use crate::preload::preload;

const VISIBLE: &str = "is-visible";

struct CarouselRuntime {
    machine: RefCell<Carousel>,
    slots: [HtmlImageElement; 2],
    caption: Option<HtmlElement>,
    frame: RefCell<Option<AnimationFrame>>,
    cooldown: RefCell<Option<Timeout>>,
}

/// Live carousel. Dropping it detaches the click listener and cancels any
/// pending frame or cooldown.
pub struct CarouselBinding {
    runtime: Rc<CarouselRuntime>,
    _click: Option<EventListener>,
}

impl CarouselBinding {
    /// Bind to a rendered `.pt-carousel-wrap`. Returns `None` if the markup
    /// doesn't have the expected slots.
    pub fn install(wrap: &Element, items: Vec<CarouselItem>, config: &FolioConfig) -> Option<Self> {
        let root = query(wrap, ".pt-carousel")?;
        let mut slots = query_all(&root, ".pt-carousel-img")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlImageElement>().ok());
        let slots = [slots.next()?, slots.next()?];
        let caption = query(wrap, ".pt-caption").and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let transition = format!("opacity {}ms ease-in-out", config.crossfade_ms);
        for slot in &slots {
            set_style(slot, "transition", &transition);
            toggle_class(slot, VISIBLE, false);
        }

        let machine = Carousel::new(items, config.carousel_cooldown_ms);
        let inert = machine.is_inert();
        let runtime = Rc::new(CarouselRuntime {
            machine: RefCell::new(machine),
            slots,
            caption,
            frame: RefCell::new(None),
            cooldown: RefCell::new(None),
        });

        let click = (!inert).then(|| {
            let weak = Rc::downgrade(&runtime);
            EventListener::new(&root, "click", move |_| {
                let Some(runtime) = weak.upgrade() else {
                    return;
                };
                let commands = runtime.machine.borrow_mut().click();
                execute(&runtime, commands);
            })
        });

        let commands = runtime.machine.borrow_mut().start();
        execute(&runtime, commands);
        tracing::debug!(items = runtime.machine.borrow().len(), inert, "carousel installed");

        Some(Self {
            runtime,
            _click: click,
        })
    }

    pub fn visible_index(&self) -> Option<usize> {
        self.runtime.machine.borrow().visible_index()
    }

    pub fn is_inert(&self) -> bool {
        self.runtime.machine.borrow().is_inert()
    }
}

fn execute(runtime: &Rc<CarouselRuntime>, commands: Vec<CarouselCommand>) {
    for command in commands {
        match command {
            CarouselCommand::Preload { ticket, url } => {
                let weak = Rc::downgrade(runtime);
                wasm_bindgen_futures::spawn_local(async move {
                    let result = preload(&url).await;
                    let Some(runtime) = weak.upgrade() else {
                        return;
                    };
                    let commands = match result {
                        Ok(size) => runtime.machine.borrow_mut().preloaded(ticket, size),
                        Err(_) => runtime.machine.borrow_mut().preload_failed(ticket),
                    };
                    execute(&runtime, commands);
                });
            }
            CarouselCommand::Paint {
                slot,
                url,
                alt,
                fit,
            } => {
                let img = &runtime.slots[slot.index()];
                toggle_class(img, "fit-cover", fit == Fit::Cover);
                toggle_class(img, "fit-contain", fit == Fit::Contain);
                img.set_src(&url);
                img.set_alt(&alt);
            }
            CarouselCommand::RequestFrame => {
                let weak = Rc::downgrade(runtime);
                let handle = request_animation_frame(move |_| {
                    let Some(runtime) = weak.upgrade() else {
                        return;
                    };
                    runtime.frame.borrow_mut().take();
                    let commands = runtime.machine.borrow_mut().frame();
                    execute(&runtime, commands);
                });
                *runtime.frame.borrow_mut() = Some(handle);
            }
            CarouselCommand::Reveal(slot) => {
                toggle_class(&runtime.slots[slot.index()], VISIBLE, true);
            }
            CarouselCommand::Hide(slot) => {
                toggle_class(&runtime.slots[slot.index()], VISIBLE, false);
            }
            CarouselCommand::Caption(label) => {
                if let Some(caption) = &runtime.caption {
                    caption.set_text_content(Some(label.as_str()));
                    caption.set_hidden(false);
                }
            }
            CarouselCommand::StartCooldown(ms) => {
                let weak = Rc::downgrade(runtime);
                let timeout = Timeout::new(ms, move || {
                    if let Some(runtime) = weak.upgrade() {
                        runtime.machine.borrow_mut().cooldown_elapsed();
                    }
                });
                *runtime.cooldown.borrow_mut() = Some(timeout);
            }
        }
    }
}
