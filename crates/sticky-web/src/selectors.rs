#![forbid(unsafe_code)]

//! The DOM contract: attribute names the host reads and writes.

use sticky_core::PanelKey;

/// Marks the header root.
pub const HEADER_ATTR: &str = "data-sticky-header";
/// Panel container, valued `add` or `filters`.
pub const PANEL_ATTR: &str = "data-sticky-panel";
/// Floating pill that reopens a panel.
pub const PILL_ATTR: &str = "data-sticky-pill";
/// Collapse ("−") control inside a panel.
pub const COLLAPSE_ATTR: &str = "data-sticky-collapse";

/// Written on the root: `top` or `scrolled`.
pub const MODE_ATTR: &str = "data-sticky-mode";
/// Written on the root: `mobile` or `desktop`.
pub const VIEWPORT_ATTR: &str = "data-sticky-viewport";
/// Written on panels: `true` or `false`.
pub const EXPANDED_ATTR: &str = "data-expanded";
pub const HIDDEN_ATTR: &str = "hidden";
pub const ARIA_EXPANDED_ATTR: &str = "aria-expanded";

/// First-focus candidates inside a panel.
pub const FOCUSABLE: &str = "input:not([disabled]), select:not([disabled]), \
     textarea:not([disabled]), button:not([disabled]), a[href], \
     [tabindex]:not([tabindex='-1'])";

#[must_use]
pub fn header_root() -> String {
    format!("[{HEADER_ATTR}]")
}

/// `[attr]`, matching any element carrying `attr`.
#[must_use]
pub fn any_of(attr: &str) -> String {
    format!("[{attr}]")
}

/// `[attr="key"]`.
#[must_use]
pub fn keyed(attr: &str, key: PanelKey) -> String {
    format!("[{attr}=\"{}\"]", key.as_str())
}

/// Parse an attribute value into a panel key. Unknown values are ignored.
#[must_use]
pub fn panel_from_attr(value: Option<&str>) -> Option<PanelKey> {
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_selector_quotes_the_key() {
        assert_eq!(
            keyed(PILL_ATTR, PanelKey::Filters),
            r#"[data-sticky-pill="filters"]"#
        );
        assert_eq!(header_root(), "[data-sticky-header]");
    }

    #[test]
    fn attribute_values_parse_leniently() {
        assert_eq!(panel_from_attr(Some(" add ")), Some(PanelKey::Add));
        assert_eq!(panel_from_attr(Some("tags")), None);
        assert_eq!(panel_from_attr(None), None);
    }
}
