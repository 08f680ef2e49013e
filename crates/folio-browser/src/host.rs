//! [`SessionHost`] over a real DOM container.

use folio_core::{
    CarouselItem, FolioConfig, FolioError, RenderedDocument, Result, SessionHost, Viewport,
};
use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use web_sys::HtmlElement;

use crate::carousel::CarouselBinding;
use crate::dom::query;
use crate::lightbox::{LightboxBinding, SharedLightbox};
use crate::notes::NotesBinding;

/// Rendered markup in the container. Dropping it empties the container and
/// lifts the context-menu block, if any.
pub struct MountedContainer {
    element: HtmlElement,
    _context_menu: Option<EventListener>,
}

impl MountedContainer {
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Drop for MountedContainer {
    fn drop(&mut self) {
        self.element.set_inner_html("");
    }
}

/// Mounts documents into one container element.
pub struct BrowserHost {
    container: HtmlElement,
    config: FolioConfig,
    lightbox: SharedLightbox,
}

impl BrowserHost {
    pub fn new(container: HtmlElement, config: FolioConfig, lightbox: SharedLightbox) -> Self {
        Self {
            container,
            config,
            lightbox,
        }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    pub fn lightbox(&self) -> &SharedLightbox {
        &self.lightbox
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.config.breakpoint_px)
    }
}

fn block_context_menu() -> Result<EventListener> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(FolioError::HostUnavailable("document"))?;
    let options = EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: false,
    };
    Ok(EventListener::new_with_options(
        &document,
        "contextmenu",
        options,
        |event| event.prevent_default(),
    ))
}

impl SessionHost for BrowserHost {
    type Container = MountedContainer;
    type CarouselGuard = Option<CarouselBinding>;
    type NotesGuard = NotesBinding;
    type LightboxGuard = LightboxBinding;

    fn render(&mut self, rendered: &RenderedDocument) -> Result<MountedContainer> {
        let context_menu = if self.config.suppress_context_menu {
            Some(block_context_menu()?)
        } else {
            None
        };
        self.container.set_inner_html(&rendered.html);
        Ok(MountedContainer {
            element: self.container.clone(),
            _context_menu: context_menu,
        })
    }

    fn install_carousel(
        &mut self,
        container: &MountedContainer,
        index: usize,
        items: Vec<CarouselItem>,
    ) -> Option<CarouselBinding> {
        let selector = format!(".pt-carousel-wrap[data-carousel=\"{index}\"]");
        let Some(wrap) = query(container.element(), &selector) else {
            tracing::warn!(index, "rendered carousel missing from container");
            return None;
        };
        CarouselBinding::install(&wrap, items, &self.config)
    }

    fn install_notes(&mut self, container: &MountedContainer) -> NotesBinding {
        NotesBinding::install(container.element(), self.viewport())
    }

    fn install_lightbox(&mut self, container: &MountedContainer) -> LightboxBinding {
        LightboxBinding::bind(container.element(), self.lightbox.clone(), self.viewport())
    }

    fn close_lightbox(&mut self) {
        self.lightbox.close();
    }
}
