//! Full-viewport image lightbox.
//!
//! A page has exactly one lightbox overlay, shared by every document mounted
//! into it. [`Lightbox`] tracks whether it is open and which image it shows;
//! opening locks the page scroll in place and closing restores the exact
//! offset the reader was at.

use crate::carousel::NaturalSize;

#[derive(Debug, Clone, PartialEq)]
pub enum LightboxCommand {
    /// Pin the body at `-y` so the page can't scroll underneath.
    LockScroll { y: f64 },
    /// Populate and show the overlay.
    Show {
        src: String,
        alt: String,
        caption: String,
    },
    /// Measure the image and report back through [`Lightbox::orientation`].
    ProbeOrientation { src: String },
    /// Hide the overlay and clear its image and caption.
    Hide,
    /// Restore normal flow and scroll back to `y`.
    UnlockScroll { y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Missing dimensions count as 1 so an unmeasurable image is horizontal.
    pub fn for_size(size: NaturalSize) -> Self {
        if size.width.max(1) >= size.height.max(1) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Orientation::Horizontal => "is-horizontal",
            Orientation::Vertical => "is-vertical",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lightbox {
    open: bool,
    current_src: Option<String>,
    saved_scroll_y: f64,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_src(&self) -> Option<&str> {
        self.current_src.as_deref()
    }

    pub fn saved_scroll_y(&self) -> f64 {
        self.saved_scroll_y
    }

    /// Show `src`. The scroll offset is only captured by the first open; a
    /// re-open while showing swaps the image and keeps the lock as it is.
    pub fn open(&mut self, src: &str, alt: &str, caption: &str, scroll_y: f64) -> Vec<LightboxCommand> {
        if src.is_empty() {
            return Vec::new();
        }
        let mut commands = Vec::with_capacity(3);
        if !self.open {
            self.saved_scroll_y = scroll_y;
            commands.push(LightboxCommand::LockScroll { y: scroll_y });
        }
        self.open = true;
        self.current_src = Some(src.to_string());
        commands.push(LightboxCommand::Show {
            src: src.to_string(),
            alt: alt.to_string(),
            caption: caption.to_string(),
        });
        commands.push(LightboxCommand::ProbeOrientation {
            src: src.to_string(),
        });
        commands
    }

    pub fn close(&mut self) -> Vec<LightboxCommand> {
        if !self.open {
            return Vec::new();
        }
        self.open = false;
        self.current_src = None;
        vec![
            LightboxCommand::Hide,
            LightboxCommand::UnlockScroll {
                y: self.saved_scroll_y,
            },
        ]
    }

    /// Orientation probe finished. Only applies if `src` is still showing.
    pub fn orientation(&self, src: &str, size: NaturalSize) -> Option<Orientation> {
        (self.open && self.current_src.as_deref() == Some(src)).then(|| Orientation::for_size(size))
    }
}

/// What a click landed on, as far as zoom eligibility is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoomCandidate {
    pub inside_container: bool,
    pub inside_carousel: bool,
    pub is_carousel_slot: bool,
    pub is_icon_glyph: bool,
    /// Inside a footnote anchor, where clicks toggle the note instead.
    pub inside_footnote: bool,
}

/// Whether a clicked image should open in the lightbox.
pub fn qualifies_for_lightbox(candidate: &ZoomCandidate, narrow_viewport: bool) -> bool {
    !narrow_viewport
        && candidate.inside_container
        && !candidate.inside_carousel
        && !candidate.is_carousel_slot
        && !candidate.is_icon_glyph
        && !candidate.inside_footnote
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_round_trip() {
        let mut lightbox = Lightbox::new();
        let cmds = lightbox.open("https://x/a.jpg", "A", "Cap", 1234.0);
        assert_eq!(cmds[0], LightboxCommand::LockScroll { y: 1234.0 });
        assert!(lightbox.is_open());

        let cmds = lightbox.close();
        assert_eq!(
            cmds,
            vec![LightboxCommand::Hide, LightboxCommand::UnlockScroll { y: 1234.0 }]
        );
        assert!(!lightbox.is_open());
        assert_eq!(lightbox.current_src(), None);
    }

    #[test]
    fn test_second_open_does_not_relock() {
        let mut lightbox = Lightbox::new();
        lightbox.open("a.jpg", "", "", 500.0);
        let cmds = lightbox.open("b.jpg", "", "", 9999.0);
        assert!(
            cmds.iter()
                .all(|c| !matches!(c, LightboxCommand::LockScroll { .. }))
        );
        assert_eq!(lightbox.saved_scroll_y(), 500.0);
        assert_eq!(
            lightbox.close()[1],
            LightboxCommand::UnlockScroll { y: 500.0 }
        );
    }

    #[test]
    fn test_ignored_inputs() {
        let mut lightbox = Lightbox::new();
        assert!(lightbox.open("", "alt", "cap", 10.0).is_empty());
        assert!(!lightbox.is_open());
        assert!(lightbox.close().is_empty());
    }

    #[test]
    fn test_orientation_only_for_current_image() {
        let mut lightbox = Lightbox::new();
        let tall = NaturalSize {
            width: 400,
            height: 900,
        };
        lightbox.open("a.jpg", "", "", 0.0);
        lightbox.open("b.jpg", "", "", 0.0);
        assert_eq!(lightbox.orientation("a.jpg", tall), None);
        assert_eq!(lightbox.orientation("b.jpg", tall), Some(Orientation::Vertical));
        lightbox.close();
        assert_eq!(lightbox.orientation("b.jpg", tall), None);
        assert_eq!(
            Orientation::for_size(NaturalSize {
                width: 0,
                height: 0
            }),
            Orientation::Horizontal
        );
    }

    #[test]
    fn test_zoom_eligibility() {
        let plain = ZoomCandidate {
            inside_container: true,
            ..Default::default()
        };
        assert!(qualifies_for_lightbox(&plain, false));
        assert!(!qualifies_for_lightbox(&plain, true));
        for excluded in [
            ZoomCandidate {
                inside_carousel: true,
                ..plain.clone()
            },
            ZoomCandidate {
                is_carousel_slot: true,
                ..plain.clone()
            },
            ZoomCandidate {
                is_icon_glyph: true,
                ..plain.clone()
            },
            ZoomCandidate {
                inside_footnote: true,
                ..plain.clone()
            },
            ZoomCandidate::default(),
        ] {
            assert!(!qualifies_for_lightbox(&excluded, false));
        }
    }
}
