//! Small DOM helpers shared by the bindings.
//!
//! Individual DOM calls that fail are swallowed here; a missing element or a
//! rejected selector means "nothing to do", never an error for the reader.

use folio_core::FolioError;
use gloo_utils::errors::JsError;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, HtmlElement, Node};

/// The element an event targeted. Text-node targets resolve to their parent.
pub(crate) fn event_element(event: &Event) -> Option<Element> {
    let target = event.target()?;
    match target.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(target) => target.dyn_into::<Node>().ok()?.parent_element(),
    }
}

pub(crate) fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

pub(crate) fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Create an element with a class, without attaching it anywhere.
pub(crate) fn create_element(tag: &str, class: &str) -> Option<HtmlElement> {
    let document = web_sys::window()?.document()?;
    let element = document.create_element(tag).ok()?;
    element.set_class_name(class);
    element.dyn_into::<HtmlElement>().ok()
}

pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

pub(crate) fn clear_style(element: &HtmlElement, property: &str) {
    let _ = element.style().remove_property(property);
}

pub(crate) fn toggle_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

pub(crate) fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

/// Turn a thrown JS value into a host error.
pub(crate) fn host_error(value: JsValue) -> FolioError {
    match JsError::try_from(value) {
        Ok(err) => FolioError::Host(err.to_string()),
        Err(not_error) => FolioError::Host(not_error.to_string()),
    }
}
