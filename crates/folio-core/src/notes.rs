//! Margin notes.
//!
//! On wide viewports every footnote gets a panel in the left or right margin,
//! positioned level with its anchor; clicking an anchor shows its panel. On
//! narrow viewports the note is instead expanded inline right after the
//! anchor. This module holds the parts of both that don't need a DOM:
//!
//! - [`compute_layout`] turns a geometry snapshot into panel placements.
//! - [`MarginNotes`] and [`InlineToggle`] track which note is open.
//! - [`LayoutScheduler`] coalesces re-layout triggers onto one frame.
//! - [`NoteModeSwitch`] tears one mode down before installing the other.

use crate::hash::{NoteId, Side, footnote_id, footnote_key, footnote_side};

/// Breakpoint between the inline and margin presentations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub breakpoint_px: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { breakpoint_px: 768 }
    }
}

impl Viewport {
    pub fn new(breakpoint_px: u32) -> Self {
        Self { breakpoint_px }
    }

    /// Narrow viewports include the breakpoint itself.
    pub fn is_narrow(&self, width: f64) -> bool {
        width <= f64::from(self.breakpoint_px)
    }

    pub fn mode_for(&self, width: f64) -> NoteMode {
        if self.is_narrow(width) {
            NoteMode::Mobile
        } else {
            NoteMode::Desktop
        }
    }

    /// Media query matching exactly the narrow widths.
    pub fn media_query(&self) -> String {
        format!("(max-width: {}px)", self.breakpoint_px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMode {
    Desktop,
    Mobile,
}

// === Desktop layout ===

/// What a layout pass reads from one anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSnapshot {
    /// Visible anchor text, untrimmed.
    pub text: String,
    /// Rendered note markup.
    pub note_html: String,
    /// Anchor top relative to the container top, in pixels.
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotePlacement {
    /// Index of the anchor in document order.
    pub anchor: usize,
    pub id: NoteId,
    pub side: Side,
    pub top: f64,
    pub note_html: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginLayout {
    pub placements: Vec<NotePlacement>,
}

impl MarginLayout {
    pub fn contains(&self, id: &str) -> bool {
        self.placements.iter().any(|p| p.id == id)
    }

    pub fn side(&self, side: Side) -> impl Iterator<Item = &NotePlacement> {
        self.placements.iter().filter(move |p| p.side == side)
    }
}

/// Place every anchor's note level with the anchor, on the side its identity
/// picks. Panels may overlap; nothing is reflowed.
pub fn compute_layout(anchors: &[AnchorSnapshot]) -> MarginLayout {
    let placements = anchors
        .iter()
        .enumerate()
        .map(|(anchor, snapshot)| {
            let key = footnote_key(snapshot.text.trim(), &snapshot.note_html);
            NotePlacement {
                anchor,
                id: footnote_id(&key),
                side: footnote_side(&key),
                top: snapshot.top,
                note_html: snapshot.note_html.clone(),
            }
        })
        .collect();
    MarginLayout { placements }
}

/// Which margin panel is showing. At most one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarginNotes {
    active: Option<NoteId>,
}

impl MarginNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&NoteId> {
        self.active.as_ref()
    }

    /// Anchor clicked: show its panel, or hide it if it was already showing.
    pub fn toggle(&mut self, id: &str, layout: &MarginLayout) -> Option<&NoteId> {
        if self.active.as_deref() == Some(id) || !layout.contains(id) {
            self.active = None;
        } else {
            self.active = Some(NoteId::new(id));
        }
        self.active.as_ref()
    }

    /// Click anywhere that isn't an anchor.
    pub fn close(&mut self) {
        self.active = None;
    }

    /// Re-apply after a layout pass rebuilt the panels. An active note that
    /// no longer exists stays remembered but has nothing to show.
    pub fn after_layout(&self, layout: &MarginLayout) -> Option<&NoteId> {
        self.active.as_ref().filter(|id| layout.contains(id))
    }
}

// === Mobile toggles ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineChange {
    /// Remove the expansion after this anchor.
    Collapse(usize),
    /// Insert an expansion after this anchor.
    Expand(usize),
}

/// Which anchor has its note expanded inline. At most one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineToggle {
    open: Option<usize>,
}

impl InlineToggle {
    pub fn open_anchor(&self) -> Option<usize> {
        self.open
    }

    pub fn click_anchor(&mut self, anchor: usize) -> Vec<InlineChange> {
        match self.open.take() {
            Some(open) if open == anchor => vec![InlineChange::Collapse(open)],
            Some(open) => {
                self.open = Some(anchor);
                vec![InlineChange::Collapse(open), InlineChange::Expand(anchor)]
            }
            None => {
                self.open = Some(anchor);
                vec![InlineChange::Expand(anchor)]
            }
        }
    }

    /// Click outside every anchor and expansion.
    pub fn click_outside(&mut self) -> Option<InlineChange> {
        self.open.take().map(InlineChange::Collapse)
    }
}

// === Scheduling ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Request a frame and run a pass in it.
    Request,
    /// Drop the pending frame and request a fresh one.
    Replace,
    /// Scheduler is stopped; do nothing.
    Stopped,
}

/// Coalesces layout triggers so that any number of them arriving before the
/// next frame produce one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutScheduler {
    pending: bool,
    stopped: bool,
    passes: u64,
}

impl LayoutScheduler {
    pub fn request(&mut self) -> Schedule {
        if self.stopped {
            return Schedule::Stopped;
        }
        if std::mem::replace(&mut self.pending, true) {
            Schedule::Replace
        } else {
            Schedule::Request
        }
    }

    /// The frame fired. Returns whether a pass should run.
    pub fn begin_pass(&mut self) -> bool {
        if self.stopped || !std::mem::take(&mut self.pending) {
            return false;
        }
        self.passes += 1;
        true
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}

// === Mode strategies ===

/// One presentation of notes for a container. Dropping the guard undoes
/// everything `install` did.
pub trait NoteStrategy<C> {
    type Guard;

    fn install(&self, container: &C) -> Self::Guard;
}

/// Installs whichever strategy a mode calls for.
pub trait NoteModeInstaller {
    type Guard;

    fn install(&mut self, mode: NoteMode) -> Self::Guard;
}

/// Holds the installed mode and swaps it when the viewport crosses the
/// breakpoint.
pub struct NoteModeSwitch<I: NoteModeInstaller> {
    installer: I,
    current: Option<(NoteMode, I::Guard)>,
}

impl<I: NoteModeInstaller> NoteModeSwitch<I> {
    pub fn new(installer: I) -> Self {
        Self {
            installer,
            current: None,
        }
    }

    pub fn mode(&self) -> Option<NoteMode> {
        self.current.as_ref().map(|(mode, _)| *mode)
    }

    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Install `mode`. The previous mode is fully torn down before the new
    /// one is installed; applying the current mode again does nothing.
    pub fn apply(&mut self, mode: NoteMode) {
        if self.mode() == Some(mode) {
            return;
        }
        if let Some((previous, guard)) = self.current.take() {
            tracing::debug!(?previous, next = ?mode, "switching note mode");
            drop(guard);
        }
        let guard = self.installer.install(mode);
        self.current = Some((mode, guard));
    }

    pub fn shutdown(&mut self) {
        self.current = None;
    }
}

impl<I: NoteModeInstaller> Drop for NoteModeSwitch<I> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
