//! Note mode switching for a mounted container.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{NoteMode, NoteModeInstaller, NoteModeSwitch, NoteStrategy, Viewport};
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MediaQueryList};

use crate::inline::{MobileNotes, MobileStrategy};
use crate::margin::{DesktopNotes, DesktopStrategy};

/// Whichever mode is installed right now.
pub enum ActiveNotes {
    Desktop(Option<DesktopNotes>),
    Mobile(MobileNotes),
}

/// Installs the desktop or mobile strategy on one container.
pub struct BrowserNoteInstaller {
    container: HtmlElement,
}

impl BrowserNoteInstaller {
    pub fn new(container: HtmlElement) -> Self {
        Self { container }
    }
}

impl NoteModeInstaller for BrowserNoteInstaller {
    type Guard = ActiveNotes;

    fn install(&mut self, mode: NoteMode) -> Self::Guard {
        match mode {
            NoteMode::Desktop => ActiveNotes::Desktop(DesktopStrategy.install(&self.container)),
            NoteMode::Mobile => ActiveNotes::Mobile(MobileStrategy.install(&self.container)),
        }
    }
}

fn current_mode(viewport: Viewport, query: Option<&MediaQueryList>) -> NoteMode {
    if let Some(query) = query {
        return if query.matches() {
            NoteMode::Mobile
        } else {
            NoteMode::Desktop
        };
    }
    let width = web_sys::window()
        .and_then(|window| window.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(f64::INFINITY);
    viewport.mode_for(width)
}

/// Notes for a mounted container, following the viewport across the
/// breakpoint. Dropping it tears down the installed mode.
pub struct NotesBinding {
    switch: Rc<RefCell<NoteModeSwitch<BrowserNoteInstaller>>>,
    _media: Option<EventListener>,
}

impl NotesBinding {
    pub fn install(container: &HtmlElement, viewport: Viewport) -> Self {
        let query = web_sys::window()
            .and_then(|window| window.match_media(&viewport.media_query()).ok().flatten());

        let switch = Rc::new(RefCell::new(NoteModeSwitch::new(BrowserNoteInstaller::new(
            container.clone(),
        ))));
        switch
            .borrow_mut()
            .apply(current_mode(viewport, query.as_ref()));

        let media = query.map(|query| {
            let weak = Rc::downgrade(&switch);
            let target = query.clone();
            EventListener::new(&target, "change", move |event| {
                let Some(switch) = weak.upgrade() else {
                    return;
                };
                let narrow = event
                    .dyn_ref::<web_sys::MediaQueryListEvent>()
                    .map(|event| event.matches())
                    .unwrap_or_else(|| query.matches());
                let mode = if narrow {
                    NoteMode::Mobile
                } else {
                    NoteMode::Desktop
                };
                tracing::debug!(?mode, "viewport crossed note breakpoint");
                switch.borrow_mut().apply(mode);
            })
        });

        Self {
            switch,
            _media: media,
        }
    }

    pub fn mode(&self) -> Option<NoteMode> {
        self.switch.borrow().mode()
    }

    /// Force a mode, as a viewport change would.
    pub fn apply(&self, mode: NoteMode) {
        self.switch.borrow_mut().apply(mode);
    }
}

impl Drop for NotesBinding {
    fn drop(&mut self) {
        self.switch.borrow_mut().shutdown();
    }
}
