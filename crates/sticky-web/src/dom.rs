#![forbid(unsafe_code)]

//! `web-sys` implementation of [`HeaderHost`].
//!
//! Elements are looked up on every write so panels and pills re-rendered by
//! the page are picked up. A missing element receives nothing.

use sticky_core::{HeaderHost, HeaderPresentation, HeaderProbe, PanelKey};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Window};

use crate::attributes::{AttributeWrite, attribute_writes};
use crate::selectors::{FOCUSABLE, PANEL_ATTR, any_of, keyed, panel_from_attr};

pub(crate) struct DomHost {
    window: Window,
    document: Document,
    root: HtmlElement,
}

impl DomHost {
    pub(crate) fn new(window: Window, document: Document, root: HtmlElement) -> Self {
        Self {
            window,
            document,
            root,
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window
            .scroll_y()
            .or_else(|_| self.window.page_y_offset())
            .unwrap_or(0.0)
    }

    fn elements(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn write(element: &Element, write: &AttributeWrite) {
        // Attribute writes only fail for invalid names, which are constants.
        let _ = match write.value {
            Some(value) => element.set_attribute(write.name, value),
            None => element.remove_attribute(write.name),
        };
    }
}

/// `offsetTop` of `element` and each `offsetParent` above it.
fn offset_chain(element: &HtmlElement) -> Vec<f64> {
    let mut chain = Vec::new();
    let mut current = Some(element.clone());
    while let Some(el) = current {
        chain.push(f64::from(el.offset_top()));
        current = el
            .offset_parent()
            .and_then(|parent| parent.dyn_into::<HtmlElement>().ok());
    }
    chain
}

impl HeaderHost for DomHost {
    fn probe(&self) -> Option<HeaderProbe> {
        if !self.root.is_connected() {
            return None;
        }
        let rect = self.root.get_bounding_client_rect();
        Some(HeaderProbe {
            offset_chain: offset_chain(&self.root),
            bounding_top: rect.top(),
            bounding_bottom: rect.bottom(),
            height: rect.height(),
            scroll_y: self.scroll_y(),
        })
    }

    fn apply(&mut self, presentation: &HeaderPresentation) {
        for write in attribute_writes(presentation) {
            match write.target.locator() {
                None => Self::write(&self.root, &write),
                Some((attr, key)) => {
                    for element in self.elements(&keyed(attr, key)) {
                        Self::write(&element, &write);
                    }
                }
            }
        }
    }

    fn focus_first_control(&mut self, panel: PanelKey) -> bool {
        let Some(container) = self.elements(&keyed(PANEL_ATTR, panel)).into_iter().next() else {
            return false;
        };
        let Some(control) = container
            .query_selector(FOCUSABLE)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return false;
        };
        control.focus().is_ok()
    }
}

/// The panel named by the nearest ancestor of `event.target` carrying
/// `attr`, e.g. the pill that was clicked.
pub(crate) fn panel_for_event(event: &Event, attr: &str) -> Option<PanelKey> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let owner = target.closest(&any_of(attr)).ok().flatten()?;
    panel_from_attr(owner.get_attribute(attr).as_deref())
}
