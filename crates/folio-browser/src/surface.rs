//! A container that documents are mounted into.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{Document, DocumentSession, FolioConfig, FolioError, Post, Result, render_post_shell};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::dom::query;
use crate::host::BrowserHost;
use crate::lightbox::SharedLightbox;
use crate::navigation::{NavigationRegistration, on_navigation_start};

/// One reading surface. Mounted documents are torn down on navigation start,
/// on [`ReadingSurface::unmount`] and when the surface is dropped.
pub struct ReadingSurface {
    session: Rc<RefCell<DocumentSession<BrowserHost>>>,
    /// Outer container when the surface was built around a post shell.
    shell: Option<HtmlElement>,
    _navigation: NavigationRegistration,
}

impl ReadingSurface {
    /// Surface sharing the page lightbox.
    pub fn new(container: HtmlElement, config: FolioConfig) -> Self {
        Self::with_lightbox(container, config, SharedLightbox::for_page())
    }

    pub fn with_lightbox(container: HtmlElement, config: FolioConfig, lightbox: SharedLightbox) -> Self {
        let event_name = config.navigation_start_event.clone();
        let host = BrowserHost::new(container, config.clone(), lightbox.clone());
        let session = Rc::new(RefCell::new(DocumentSession::new(host, config)));

        let weak = Rc::downgrade(&session);
        let navigation = on_navigation_start(&event_name, move || {
            lightbox.close();
            let Some(session) = weak.upgrade() else {
                return;
            };
            match session.try_borrow_mut() {
                Ok(mut session) => session.teardown(),
                Err(_) => tracing::warn!("navigation started during a mount, teardown skipped"),
            }
        });

        Self {
            session,
            shell: None,
            _navigation: navigation,
        }
    }

    /// Render a post's title bar and description into `container`, then mount
    /// its content into the shell's body.
    pub fn for_post(container: HtmlElement, post: &Post, config: FolioConfig) -> Result<Self> {
        container.set_inner_html(&render_post_shell(post, config.suppress_context_menu));
        let body = query(&container, ".post-body")
            .and_then(|body| body.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| FolioError::Host("post shell has no body".into()))?;
        let mut surface = Self::new(body, config);
        surface.shell = Some(container);
        surface.mount(&post.content)?;
        Ok(surface)
    }

    pub fn mount(&self, document: &Document) -> Result<()> {
        self.session.borrow_mut().mount(document)
    }

    /// Parse `json` as a document and mount it.
    pub fn mount_json(&self, json: &str) -> Result<()> {
        let document = Document::from_json(json)?;
        self.mount(&document)
    }

    pub fn replace(&self, document: &Document) -> Result<()> {
        self.session.borrow_mut().replace(document)
    }

    pub fn unmount(&self) {
        self.session.borrow_mut().teardown();
    }

    pub fn is_mounted(&self) -> bool {
        self.session.borrow().is_mounted()
    }

    pub fn carousel_count(&self) -> usize {
        self.session.borrow().carousel_count()
    }

    pub fn footnote_count(&self) -> usize {
        self.session.borrow().footnote_count()
    }

    pub fn lightbox(&self) -> SharedLightbox {
        self.session.borrow().host().lightbox().clone()
    }
}

impl Drop for ReadingSurface {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.teardown();
        }
        if let Some(shell) = self.shell.take() {
            shell.set_inner_html("");
        }
    }
}
