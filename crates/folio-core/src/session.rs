//! Document session lifecycle.
//!
//! A [`DocumentSession`] owns everything that exists because one document is
//! mounted: the rendered container, one binding per carousel, the note mode
//! switch and the lightbox binding. Each of those is a guard handed back by
//! the [`SessionHost`]; teardown is dropping them in the right order.

use crate::assets::ImageUrlResolver;
use crate::carousel::{CarouselItem, resolve_items};
use crate::config::FolioConfig;
use crate::error::Result;
use crate::model::Document;
use crate::render::{RenderContext, RenderedDocument, render_document};

/// The environment a session mounts into.
///
/// Every guard detaches what it installed when dropped.
pub trait SessionHost {
    /// Mounted markup. Dropping it clears the container.
    type Container;
    type CarouselGuard;
    type NotesGuard;
    type LightboxGuard;

    /// Put the rendered markup on screen.
    fn render(&mut self, rendered: &RenderedDocument) -> Result<Self::Container>;

    /// Bind the carousel rendered with `data-carousel="{index}"`.
    fn install_carousel(
        &mut self,
        container: &Self::Container,
        index: usize,
        items: Vec<CarouselItem>,
    ) -> Self::CarouselGuard;

    /// Install the note mode switch for the current viewport.
    fn install_notes(&mut self, container: &Self::Container) -> Self::NotesGuard;

    /// Route image clicks in the container to the shared lightbox.
    fn install_lightbox(&mut self, container: &Self::Container) -> Self::LightboxGuard;

    /// Force the shared lightbox closed.
    fn close_lightbox(&mut self);
}

struct Mounted<H: SessionHost> {
    container: Option<H::Container>,
    carousels: Vec<H::CarouselGuard>,
    notes: Option<H::NotesGuard>,
    lightbox: Option<H::LightboxGuard>,
    footnote_count: usize,
}

pub struct DocumentSession<H: SessionHost> {
    host: H,
    config: FolioConfig,
    resolver: Box<dyn ImageUrlResolver>,
    mounted: Option<Mounted<H>>,
}

impl<H: SessionHost> DocumentSession<H> {
    /// Session using the resolver the config describes.
    pub fn new(host: H, config: FolioConfig) -> Self {
        let resolver = config.resolver();
        Self::with_resolver(host, config, resolver)
    }

    pub fn with_resolver(host: H, config: FolioConfig, resolver: Box<dyn ImageUrlResolver>) -> Self {
        Self {
            host,
            config,
            resolver,
            mounted: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn carousel_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.carousels.len())
    }

    pub fn footnote_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.footnote_count)
    }

    /// Render `document` and bring every engine up on it. A session that is
    /// already mounted is torn down first.
    pub fn mount(&mut self, document: &Document) -> Result<()> {
        self.teardown();

        let ctx = RenderContext::new(self.resolver.as_ref(), &self.config);
        let rendered = render_document(document, &ctx);
        let container = self.host.render(&rendered)?;

        let params = self.config.carousel_image_params();
        let carousels = rendered
            .carousels
            .iter()
            .map(|spec| {
                let items = resolve_items(&spec.images, self.resolver.as_ref(), &params);
                self.host.install_carousel(&container, spec.index, items)
            })
            .collect();
        let notes = self.host.install_notes(&container);
        let lightbox = self.host.install_lightbox(&container);

        tracing::debug!(
            blocks = document.blocks.len(),
            carousels = rendered.carousels.len(),
            footnotes = rendered.footnote_count,
            "document mounted"
        );
        self.mounted = Some(Mounted {
            container: Some(container),
            carousels,
            notes: Some(notes),
            lightbox: Some(lightbox),
            footnote_count: rendered.footnote_count,
        });
        Ok(())
    }

    /// Tear down and mount a new document with fresh state.
    pub fn replace(&mut self, document: &Document) -> Result<()> {
        self.mount(document)
    }

    /// Undo everything `mount` did. Safe to call when nothing is mounted.
    pub fn teardown(&mut self) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        self.host.close_lightbox();
        drop(mounted.notes.take());
        while let Some(carousel) = mounted.carousels.pop() {
            drop(carousel);
        }
        drop(mounted.lightbox.take());
        drop(mounted.container.take());
        tracing::debug!("document torn down");
    }
}

impl<H: SessionHost> Drop for DocumentSession<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use crate::error::FolioError;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Guard {
        name: String,
        log: Log,
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop {}", self.name));
        }
    }

    struct FakeHost {
        log: Log,
        fail_render: bool,
        carousel_items: Vec<Vec<CarouselItem>>,
    }

    impl FakeHost {
        fn new(log: Log) -> Self {
            Self {
                log,
                fail_render: false,
                carousel_items: Vec::new(),
            }
        }

        fn guard(&self, name: String) -> Guard {
            self.log.borrow_mut().push(format!("install {name}"));
            Guard {
                name,
                log: self.log.clone(),
            }
        }
    }

    impl SessionHost for FakeHost {
        type Container = Guard;
        type CarouselGuard = Guard;
        type NotesGuard = Guard;
        type LightboxGuard = Guard;

        fn render(&mut self, _: &RenderedDocument) -> Result<Guard> {
            if self.fail_render {
                return Err(FolioError::HostUnavailable("document"));
            }
            Ok(self.guard("container".into()))
        }

        fn install_carousel(&mut self, _: &Guard, index: usize, items: Vec<CarouselItem>) -> Guard {
            self.carousel_items.push(items);
            self.guard(format!("carousel {index}"))
        }

        fn install_notes(&mut self, _: &Guard) -> Guard {
            self.guard("notes".into())
        }

        fn install_lightbox(&mut self, _: &Guard) -> Guard {
            self.guard("lightbox".into())
        }

        fn close_lightbox(&mut self) {
            self.log.borrow_mut().push("close lightbox".into());
        }
    }

    fn document() -> Document {
        Document::from_value(json!([
            {"_type": "carousel", "images": [{"url": "https://x/1.jpg"}, {"url": "https://x/2.jpg"}]},
            {"_type": "block", "children": [{"text": "hi", "marks": ["f"]}],
             "markDefs": [{"_key": "f", "_type": "footnote", "note": []}]},
            {"_type": "carousel", "images": [{"asset": {"_ref": "image-a-2x1-jpg"}}]}
        ]))
        .unwrap()
    }

    fn cdn_config() -> FolioConfig {
        FolioConfig::from_json(r#"{"cdn": {"projectId": "p", "dataset": "d"}}"#).unwrap()
    }

    #[test]
    fn test_mount_installs_everything() {
        let log = Log::default();
        let mut session = DocumentSession::new(FakeHost::new(log.clone()), cdn_config());
        session.mount(&document()).unwrap();

        assert!(session.is_mounted());
        assert_eq!(session.carousel_count(), 2);
        assert_eq!(session.footnote_count(), 1);
        assert_eq!(
            *log.borrow(),
            [
                "install container",
                "install carousel 0",
                "install carousel 1",
                "install notes",
                "install lightbox",
            ]
        );

        let items = &session.host().carousel_items;
        assert_eq!(items[0].len(), 2);
        assert_eq!(
            items[1][0].url,
            "https://cdn.sanity.io/images/p/d/a-2x1.jpg?w=1920&q=85&auto=format"
        );
    }

    #[test]
    fn test_teardown_order() {
        let log = Log::default();
        let mut session = DocumentSession::new(FakeHost::new(log.clone()), cdn_config());
        session.mount(&document()).unwrap();
        log.borrow_mut().clear();

        session.teardown();
        assert!(!session.is_mounted());
        assert_eq!(
            *log.borrow(),
            [
                "close lightbox",
                "drop notes",
                "drop carousel 1",
                "drop carousel 0",
                "drop lightbox",
                "drop container",
            ]
        );

        log.borrow_mut().clear();
        session.teardown();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remount_tears_down_first() {
        let log = Log::default();
        let mut session = DocumentSession::new(FakeHost::new(log.clone()), FolioConfig::default());
        session.mount(&document()).unwrap();
        log.borrow_mut().clear();

        session.replace(&Document::default()).unwrap();
        let log = log.borrow();
        assert_eq!(log[0], "close lightbox");
        assert_eq!(log[5], "drop container");
        assert_eq!(log[6], "install container");
        assert_eq!(session.carousel_count(), 0);
    }

    #[test]
    fn test_failed_render_leaves_session_unmounted() {
        let log = Log::default();
        let mut host = FakeHost::new(log.clone());
        host.fail_render = true;
        let mut session = DocumentSession::new(host, FolioConfig::default());
        assert!(matches!(
            session.mount(&document()),
            Err(FolioError::HostUnavailable("document"))
        ));
        assert!(!session.is_mounted());
    }

    #[test]
    fn test_drop_tears_down() {
        let log = Log::default();
        {
            let mut session =
                DocumentSession::new(FakeHost::new(log.clone()), FolioConfig::default());
            session.mount(&document()).unwrap();
        }
        assert_eq!(log.borrow().last().map(String::as_str), Some("drop container"));
    }
}
