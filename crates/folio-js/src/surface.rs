//! JsReadingSurface - a mountable reading surface for JavaScript.

use folio_browser::ReadingSurface;
use folio_core::{Document, FolioConfig, FolioError, Post, RenderContext, render_document};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::types::{SurfaceStatus, parse_config};

fn mount_error(err: FolioError) -> JsError {
    JsError::new(&format!("Mount failed: {}", err))
}

fn parse_document(value: JsValue) -> Result<Document, JsError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid document: {}", e)))
}

/// A container that Portable Text documents are mounted into.
///
/// Mounted content is torn down on `unmount()`, on the page's navigation
/// start event, and when the surface is freed.
#[wasm_bindgen]
pub struct JsReadingSurface {
    container: HtmlElement,
    config: FolioConfig,
    inner: Option<ReadingSurface>,
    /// Whether `inner` was built around a post shell.
    post: bool,
}

#[wasm_bindgen]
impl JsReadingSurface {
    /// Create a surface over `container`. `config` may be omitted.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, config: JsValue) -> Result<JsReadingSurface, JsError> {
        let config = parse_config(config)?;
        Ok(Self {
            container,
            config,
            inner: None,
            post: false,
        })
    }

    /// Render and mount a Portable Text block array.
    pub fn mount(&mut self, document: JsValue) -> Result<(), JsError> {
        let document = parse_document(document)?;
        self.plain_surface().mount(&document).map_err(mount_error)
    }

    /// Swap in a new document with fresh carousel and note state.
    pub fn replace(&mut self, document: JsValue) -> Result<(), JsError> {
        let document = parse_document(document)?;
        self.plain_surface().replace(&document).map_err(mount_error)
    }

    /// Render a post's title bar and description, then mount its content.
    #[wasm_bindgen(js_name = mountPost)]
    pub fn mount_post(&mut self, post: JsValue) -> Result<(), JsError> {
        let post: Post = serde_wasm_bindgen::from_value(post)
            .map_err(|e| JsError::new(&format!("Invalid post: {}", e)))?;
        // The old surface clears the container on drop, so it has to go first.
        self.inner = None;
        let surface = ReadingSurface::for_post(self.container.clone(), &post, self.config.clone())
            .map_err(mount_error)?;
        self.inner = Some(surface);
        self.post = true;
        Ok(())
    }

    pub fn unmount(&mut self) {
        if let Some(surface) = &self.inner {
            surface.unmount();
        }
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.inner.as_ref().is_some_and(ReadingSurface::is_mounted)
    }

    pub fn status(&self) -> SurfaceStatus {
        match &self.inner {
            Some(surface) => SurfaceStatus {
                mounted: surface.is_mounted(),
                carousels: surface.carousel_count(),
                footnotes: surface.footnote_count(),
            },
            None => SurfaceStatus {
                mounted: false,
                carousels: 0,
                footnotes: 0,
            },
        }
    }

    /// Close the page lightbox if it is showing.
    #[wasm_bindgen(js_name = closeLightbox)]
    pub fn close_lightbox(&self) {
        if let Some(surface) = &self.inner {
            surface.lightbox().close();
        }
    }
}

impl JsReadingSurface {
    fn plain_surface(&mut self) -> &ReadingSurface {
        if self.post {
            self.inner = None;
            self.post = false;
        }
        self.inner
            .get_or_insert_with(|| ReadingSurface::new(self.container.clone(), self.config.clone()))
    }
}

/// Render a document to markup without mounting it. Nothing interactive is
/// attached.
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html(document: JsValue, config: JsValue) -> Result<String, JsError> {
    let document = parse_document(document)?;
    let config = parse_config(config)?;
    let resolver = config.resolver();
    let ctx = RenderContext::new(resolver.as_ref(), &config);
    Ok(render_document(&document, &ctx).html)
}
