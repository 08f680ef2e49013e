//! Browser DOM layer for folio reading surfaces.
//!
//! This crate drives the sans-IO engines from `folio-core` against a real
//! DOM. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `carousel`: crossfade carousel binding over two slot images
//! - `margin` / `inline`: desktop margin panels and mobile inline notes
//! - `notes`: switches between the two as the viewport crosses the breakpoint
//! - `lightbox`: the shared page overlay and the zoom click handler
//! - `navigation`: one page-wide navigation-start subscription
//! - `host` / `surface`: `SessionHost` for a container, and the surface
//!   that owns a session
//!
//! # Re-exports
//!
//! This crate re-exports `folio-core` for convenience, so consumers only
//! need to depend on `folio-browser`.

// Re-export core crate
pub use folio_core;
pub use folio_core::*;

pub mod carousel;
mod dom;
pub mod host;
pub mod inline;
pub mod lightbox;
pub mod margin;
pub mod navigation;
pub mod notes;
pub mod preload;
pub mod surface;

pub use carousel::CarouselBinding;
pub use host::{BrowserHost, MountedContainer};
pub use inline::{MobileNotes, MobileStrategy};
pub use lightbox::{LightboxBinding, SharedLightbox};
pub use margin::{DesktopNotes, DesktopStrategy, ResizeObserver};
pub use navigation::{NavigationRegistration, on_navigation_start};
pub use notes::{ActiveNotes, BrowserNoteInstaller, NotesBinding};
pub use surface::ReadingSurface;
