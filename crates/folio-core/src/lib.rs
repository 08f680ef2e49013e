//! folio-core: reading-surface logic without a DOM.
//!
//! This crate provides:
//! - `Document` / `Block` - the Portable Text document model
//! - `render_document` - block tree to HTML
//! - `Carousel` - sans-IO crossfade carousel state machine
//! - `compute_layout`, `MarginNotes`, `InlineToggle` - margin note logic
//! - `Lightbox` - shared overlay state with scroll lock bookkeeping
//! - `DocumentSession<H>` - mount/teardown lifecycle, generic over `SessionHost`

pub mod assets;
pub mod carousel;
pub mod config;
pub mod error;
pub mod hash;
pub mod lightbox;
pub mod model;
pub mod nav;
pub mod notes;
pub mod post;
pub mod render;
pub mod session;

pub use assets::{CdnImageResolver, DirectOnly, ImageFormat, ImageParams, ImageUrlResolver};
pub use carousel::{
    Carousel, CarouselCommand, CarouselItem, Fit, NaturalSize, PreloadPurpose, PreloadTicket,
    Slot, caption_label, resolve_items,
};
pub use config::{CdnConfig, FolioConfig};
pub use error::{FolioError, Result};
pub use hash::{NoteId, Side, fnv1a32, footnote_id, footnote_key, footnote_side};
pub use lightbox::{Lightbox, LightboxCommand, Orientation, ZoomCandidate, qualifies_for_lightbox};
pub use model::{
    AssetRef, Block, CarouselBlock, CarouselImage, Document, ImageBlock, MarkDef, MarkKind,
    SizeHint, Span, TextBlock, TextStyle, UnknownBlock,
};
pub use nav::{ListenerId, NavigationHub};
pub use notes::{
    AnchorSnapshot, InlineChange, InlineToggle, LayoutScheduler, MarginLayout, MarginNotes,
    NoteMode, NoteModeInstaller, NoteModeSwitch, NotePlacement, NoteStrategy, Schedule, Viewport,
    compute_layout,
};
pub use post::{Post, render_post_shell};
pub use render::{CarouselSpec, RenderContext, RenderedDocument, render_document, render_note};
pub use session::{DocumentSession, SessionHost};
pub use smol_str::SmolStr;
