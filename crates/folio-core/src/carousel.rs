//! Two-slot crossfade carousel.
//!
//! [`Carousel`] owns the logic and nothing else: it never touches an element,
//! a timer or a network request. Each input returns the [`CarouselCommand`]s
//! the host must carry out, and the host reports back through
//! [`Carousel::preloaded`], [`Carousel::preload_failed`], [`Carousel::frame`]
//! and [`Carousel::cooldown_elapsed`].
//!
//! Two image slots are stacked on top of each other. The front slot shows the
//! current frame; an advance paints the next frame into the back slot, then
//! on the following animation frame reveals the back and hides the front and
//! the two swap roles. A transition lock serialises advances: it is released
//! only once the cooldown has elapsed *and* the swap has happened.

use smol_str::SmolStr;

use crate::assets::{ImageParams, ImageUrlResolver};
use crate::model::CarouselImage;

/// A resolved carousel frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselItem {
    pub url: String,
    pub alt: String,
    pub caption: String,
}

/// Resolve every image to a URL, dropping the ones that can't be shown.
///
/// Asset references win over direct URLs; alt text falls back to the caption.
pub fn resolve_items(
    images: &[CarouselImage],
    resolver: &dyn ImageUrlResolver,
    params: &ImageParams,
) -> Vec<CarouselItem> {
    images
        .iter()
        .filter_map(|image| {
            let url = image
                .asset
                .as_ref()
                .and_then(|asset| resolver.resolve(asset, params))
                .or_else(|| image.url.clone())?;
            let caption = image.caption.clone().unwrap_or_default();
            let alt = image.alt.clone().unwrap_or_else(|| caption.clone());
            Some(CarouselItem { url, alt, caption })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    /// Position of the slot's element among the carousel's images.
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// Intrinsic size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

/// How a frame fills the carousel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Cover,
    Contain,
}

impl Fit {
    /// Landscape and square images cover, portrait images are contained.
    pub fn for_size(size: NaturalSize) -> Fit {
        if size.width >= size.height {
            Fit::Cover
        } else {
            Fit::Contain
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Fit::Cover => "fit-cover",
            Fit::Contain => "fit-contain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPurpose {
    /// The very first frame.
    First,
    /// The frame a click is advancing to.
    Advance,
    /// Warming the cache for an upcoming frame; the result is not used.
    Speculative,
}

/// Identifies one preload request so late or abandoned completions can be
/// told apart from the one the carousel is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadTicket {
    pub index: usize,
    pub purpose: PreloadPurpose,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselCommand {
    /// Fetch and decode the image, then report back with the ticket.
    Preload { ticket: PreloadTicket, url: String },
    /// Point a slot at a decoded frame.
    Paint {
        slot: Slot,
        url: String,
        alt: String,
        fit: Fit,
    },
    /// Call [`Carousel::frame`] on the next animation frame.
    RequestFrame,
    Reveal(Slot),
    Hide(Slot),
    /// New caption label text.
    Caption(SmolStr),
    /// Call [`Carousel::cooldown_elapsed`] after this many milliseconds.
    StartCooldown(u32),
}

/// Caption label: the item caption (if any) followed by a `current/total`
/// counter.
pub fn caption_label(caption: &str, position: usize, total: usize) -> SmolStr {
    if caption.is_empty() {
        smol_str::format_smolstr!("{position}/{total}")
    } else {
        smol_str::format_smolstr!(" {caption}\u{2003}{position}/{total}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    LoadingFirst,
    Steady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingFrame {
    RevealFirst,
    Swap { next: usize },
}

/// Carousel state for one carousel block.
#[derive(Debug)]
pub struct Carousel {
    items: Vec<CarouselItem>,
    cooldown_ms: u32,
    phase: Phase,
    current: usize,
    front: Slot,
    shown: bool,
    locked: bool,
    cooling_down: bool,
    pending_frame: Option<PendingFrame>,
    awaiting: Option<PreloadTicket>,
    generation: u64,
}

impl Carousel {
    pub fn new(items: Vec<CarouselItem>, cooldown_ms: u32) -> Self {
        Self {
            items,
            cooldown_ms,
            phase: Phase::Idle,
            current: 0,
            front: Slot::A,
            shown: false,
            locked: false,
            cooling_down: false,
            pending_frame: None,
            awaiting: None,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Carousels with fewer than two frames never react to clicks.
    pub fn is_inert(&self) -> bool {
        self.items.len() < 2
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    /// Index of the frame on screen, if one has been painted.
    pub fn visible_index(&self) -> Option<usize> {
        self.shown.then_some(self.current)
    }

    /// The slot currently holding the visible frame.
    pub fn front_slot(&self) -> Slot {
        self.front
    }

    /// Begin loading the first frame.
    pub fn start(&mut self) -> Vec<CarouselCommand> {
        if self.phase != Phase::Idle || self.items.is_empty() {
            return Vec::new();
        }
        self.phase = Phase::LoadingFirst;
        vec![self.preload(0, PreloadPurpose::First)]
    }

    /// A preload finished.
    pub fn preloaded(&mut self, ticket: PreloadTicket, size: NaturalSize) -> Vec<CarouselCommand> {
        match ticket.purpose {
            PreloadPurpose::Speculative => Vec::new(),
            PreloadPurpose::First => {
                if self.phase != Phase::LoadingFirst || self.awaiting != Some(ticket) {
                    return Vec::new();
                }
                self.awaiting = None;
                self.phase = Phase::Steady;
                self.shown = true;

                let mut commands = vec![
                    self.paint(self.front, 0, size),
                    self.caption(0),
                    CarouselCommand::RequestFrame,
                ];
                self.pending_frame = Some(PendingFrame::RevealFirst);
                if self.items.len() > 1 {
                    commands.push(self.preload(1, PreloadPurpose::Speculative));
                }
                commands
            }
            PreloadPurpose::Advance => {
                if self.awaiting != Some(ticket) {
                    tracing::trace!(index = ticket.index, "ignoring stale carousel preload");
                    return Vec::new();
                }
                self.awaiting = None;
                let next = ticket.index;

                let mut commands = vec![
                    self.paint(self.front.other(), next, size),
                    CarouselCommand::RequestFrame,
                    self.begin_cooldown(),
                ];
                self.pending_frame = Some(PendingFrame::Swap { next });
                let after = (next + 1) % self.items.len();
                commands.push(self.preload(after, PreloadPurpose::Speculative));
                commands
            }
        }
    }

    /// A preload failed to fetch or decode.
    pub fn preload_failed(&mut self, ticket: PreloadTicket) -> Vec<CarouselCommand> {
        if self.awaiting != Some(ticket) {
            return Vec::new();
        }
        self.awaiting = None;
        match ticket.purpose {
            PreloadPurpose::First => {
                tracing::debug!("first carousel frame failed to load");
                self.phase = Phase::Steady;
                Vec::new()
            }
            PreloadPurpose::Advance => {
                tracing::debug!(index = ticket.index, "carousel advance abandoned");
                vec![self.begin_cooldown()]
            }
            PreloadPurpose::Speculative => Vec::new(),
        }
    }

    /// The animation frame requested by [`CarouselCommand::RequestFrame`].
    pub fn frame(&mut self) -> Vec<CarouselCommand> {
        match self.pending_frame.take() {
            None => Vec::new(),
            Some(PendingFrame::RevealFirst) => vec![CarouselCommand::Reveal(self.front)],
            Some(PendingFrame::Swap { next }) => {
                let back = self.front.other();
                let commands = vec![
                    CarouselCommand::Reveal(back),
                    CarouselCommand::Hide(self.front),
                    self.caption(next),
                ];
                self.front = back;
                self.current = next;
                self.shown = true;
                tracing::trace!(current = next, "carousel swapped");
                self.release_if_settled();
                commands
            }
        }
    }

    /// Click on the carousel root.
    pub fn click(&mut self) -> Vec<CarouselCommand> {
        if self.is_inert() || self.phase != Phase::Steady || self.locked {
            return Vec::new();
        }
        self.locked = true;
        let next = (self.current + 1) % self.items.len();
        vec![self.preload(next, PreloadPurpose::Advance)]
    }

    pub fn cooldown_elapsed(&mut self) {
        self.cooling_down = false;
        self.release_if_settled();
    }

    fn release_if_settled(&mut self) {
        let swapping = matches!(self.pending_frame, Some(PendingFrame::Swap { .. }));
        if self.locked && !self.cooling_down && !swapping && self.awaiting.is_none() {
            self.locked = false;
        }
    }

    fn begin_cooldown(&mut self) -> CarouselCommand {
        self.cooling_down = true;
        CarouselCommand::StartCooldown(self.cooldown_ms)
    }

    fn preload(&mut self, index: usize, purpose: PreloadPurpose) -> CarouselCommand {
        self.generation += 1;
        let ticket = PreloadTicket {
            index,
            purpose,
            generation: self.generation,
        };
        if purpose != PreloadPurpose::Speculative {
            self.awaiting = Some(ticket);
        }
        CarouselCommand::Preload {
            ticket,
            url: self.items[index].url.clone(),
        }
    }

    fn paint(&self, slot: Slot, index: usize, size: NaturalSize) -> CarouselCommand {
        let item = &self.items[index];
        CarouselCommand::Paint {
            slot,
            url: item.url.clone(),
            alt: item.alt.clone(),
            fit: Fit::for_size(size),
        }
    }

    fn caption(&self, index: usize) -> CarouselCommand {
        let item = &self.items[index];
        CarouselCommand::Caption(caption_label(&item.caption, index + 1, self.items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    use crate::model::AssetRef;

    const LANDSCAPE: NaturalSize = NaturalSize {
        width: 1600,
        height: 900,
    };
    const PORTRAIT: NaturalSize = NaturalSize {
        width: 900,
        height: 1600,
    };

    fn items(n: usize) -> Vec<CarouselItem> {
        (0..n)
            .map(|i| CarouselItem {
                url: format!("https://x/{i}.jpg"),
                alt: format!("alt {i}"),
                caption: if i == 0 { "first".into() } else { String::new() },
            })
            .collect()
    }

    fn ticket_of(commands: &[CarouselCommand], purpose: PreloadPurpose) -> PreloadTicket {
        commands
            .iter()
            .find_map(|c| match c {
                CarouselCommand::Preload { ticket, .. } if ticket.purpose == purpose => {
                    Some(*ticket)
                }
                _ => None,
            })
            .expect("preload command")
    }

    fn started(n: usize) -> Carousel {
        let mut carousel = Carousel::new(items(n), 100);
        let cmds = carousel.start();
        let first = ticket_of(&cmds, PreloadPurpose::First);
        carousel.preloaded(first, LANDSCAPE);
        carousel.frame();
        carousel
    }

    /// Click and drive the advance through to completion.
    fn advance(carousel: &mut Carousel) {
        let cmds = carousel.click();
        let ticket = ticket_of(&cmds, PreloadPurpose::Advance);
        carousel.preloaded(ticket, LANDSCAPE);
        carousel.frame();
        carousel.cooldown_elapsed();
    }

    #[test]
    fn test_first_frame() {
        let mut carousel = Carousel::new(items(3), 100);
        let cmds = carousel.start();
        let first = ticket_of(&cmds, PreloadPurpose::First);
        assert_eq!(first.index, 0);

        let cmds = carousel.preloaded(first, PORTRAIT);
        assert_eq!(
            cmds[..3],
            [
                CarouselCommand::Paint {
                    slot: Slot::A,
                    url: "https://x/0.jpg".into(),
                    alt: "alt 0".into(),
                    fit: Fit::Contain,
                },
                CarouselCommand::Caption(SmolStr::new(" first\u{2003}1/3")),
                CarouselCommand::RequestFrame,
            ]
        );
        assert_eq!(ticket_of(&cmds, PreloadPurpose::Speculative).index, 1);
        assert_eq!(carousel.frame(), vec![CarouselCommand::Reveal(Slot::A)]);
        assert_eq!(carousel.visible_index(), Some(0));
    }

    #[test]
    fn test_advance_wraps_modulo() {
        let mut carousel = started(3);
        for m in 1..=7 {
            advance(&mut carousel);
            assert_eq!(carousel.visible_index(), Some(m % 3));
            assert!(!carousel.is_locked());
        }
    }

    #[test]
    fn test_swap_reveals_back_and_hides_front() {
        let mut carousel = started(2);
        let cmds = carousel.click();
        let ticket = ticket_of(&cmds, PreloadPurpose::Advance);
        let cmds = carousel.preloaded(ticket, LANDSCAPE);
        assert!(matches!(cmds[0], CarouselCommand::Paint { slot: Slot::B, .. }));
        assert!(cmds.contains(&CarouselCommand::StartCooldown(100)));
        // Frame 1 is still showing until the swap frame.
        assert_eq!(carousel.visible_index(), Some(0));

        let cmds = carousel.frame();
        assert_eq!(
            cmds,
            vec![
                CarouselCommand::Reveal(Slot::B),
                CarouselCommand::Hide(Slot::A),
                CarouselCommand::Caption(SmolStr::new("2/2")),
            ]
        );
        assert_eq!(carousel.front_slot(), Slot::B);
    }

    #[test]
    fn test_clicks_while_locked_are_dropped() {
        let mut carousel = started(3);
        assert_eq!(carousel.click().len(), 1);
        assert!(carousel.click().is_empty());
        assert!(carousel.click().is_empty());
    }

    #[test]
    fn test_lock_needs_cooldown_and_swap() {
        let mut carousel = started(3);
        let ticket = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        carousel.preloaded(ticket, LANDSCAPE);

        // Cooldown first: swap still pending.
        carousel.cooldown_elapsed();
        assert!(carousel.is_locked());
        carousel.frame();
        assert!(!carousel.is_locked());

        // Swap first: cooldown still pending.
        let ticket = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        carousel.preloaded(ticket, LANDSCAPE);
        carousel.frame();
        assert!(carousel.is_locked());
        carousel.cooldown_elapsed();
        assert!(!carousel.is_locked());
        assert_eq!(carousel.visible_index(), Some(2));
    }

    #[test]
    fn test_failed_advance_keeps_frame() {
        let mut carousel = started(3);
        let ticket = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        assert_eq!(
            carousel.preload_failed(ticket),
            vec![CarouselCommand::StartCooldown(100)]
        );
        assert!(carousel.frame().is_empty());
        carousel.cooldown_elapsed();
        assert!(!carousel.is_locked());
        assert_eq!(carousel.visible_index(), Some(0));

        // The same frame is attempted fresh next time.
        let ticket = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        assert_eq!(ticket.index, 1);
    }

    #[test]
    fn test_stale_tickets_are_ignored() {
        let mut carousel = started(3);
        let stale = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        carousel.preload_failed(stale);
        carousel.cooldown_elapsed();

        let fresh = ticket_of(&carousel.click(), PreloadPurpose::Advance);
        assert_ne!(stale, fresh);
        assert!(carousel.preloaded(stale, LANDSCAPE).is_empty());
        assert!(!carousel.preloaded(fresh, LANDSCAPE).is_empty());
    }

    #[test]
    fn test_inert_below_two_frames() {
        let mut single = Carousel::new(items(1), 100);
        assert!(single.is_inert());
        let first = ticket_of(&single.start(), PreloadPurpose::First);
        let cmds = single.preloaded(first, LANDSCAPE);
        assert!(cmds.iter().all(|c| !matches!(c, CarouselCommand::Preload { .. })));
        single.frame();
        assert!(single.click().is_empty());
        assert_eq!(single.visible_index(), Some(0));

        let mut empty = Carousel::new(Vec::new(), 100);
        assert!(empty.start().is_empty());
        assert!(empty.click().is_empty());
    }

    #[test]
    fn test_failed_first_frame_shows_nothing() {
        let mut carousel = Carousel::new(items(2), 100);
        let first = ticket_of(&carousel.start(), PreloadPurpose::First);
        assert!(carousel.preload_failed(first).is_empty());
        assert_eq!(carousel.visible_index(), None);
        // Still usable afterwards.
        assert_eq!(carousel.click().len(), 1);
    }

    #[test]
    fn test_clicks_ignored_while_first_loads() {
        let mut carousel = Carousel::new(items(2), 100);
        carousel.start();
        assert!(carousel.click().is_empty());
    }

    #[test]
    fn test_resolve_items() {
        let images = vec![
            CarouselImage {
                asset: Some(AssetRef {
                    id: SmolStr::new("img-1"),
                }),
                url: Some("https://fallback/1.jpg".into()),
                alt: None,
                caption: Some("Cap".into()),
            },
            CarouselImage {
                url: Some("https://direct/2.jpg".into()),
                ..Default::default()
            },
            CarouselImage::default(),
        ];
        let resolver =
            |a: &AssetRef, p: &ImageParams| Some(format!("https://cdn/{}?w={}", a.id, p.width));
        let items = resolve_items(&images, &resolver, &ImageParams::new(1920, 85));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://cdn/img-1?w=1920");
        assert_eq!(items[0].alt, "Cap");
        assert_eq!(items[1].url, "https://direct/2.jpg");
        assert_eq!(items[1].caption, "");
    }

    #[test]
    fn test_fit_and_label() {
        assert_eq!(
            Fit::for_size(NaturalSize {
                width: 10,
                height: 10
            }),
            Fit::Cover
        );
        assert_eq!(Fit::for_size(PORTRAIT).class(), "fit-contain");
        assert_eq!(caption_label("", 2, 5), "2/5");
        assert_eq!(caption_label("Dusk", 1, 3), " Dusk\u{2003}1/3");
    }
}
