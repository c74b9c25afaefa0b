#![forbid(unsafe_code)]

//! Maps a [`HeaderPresentation`] onto attribute writes.
//!
//! The DOM host resolves each [`Target`] to zero or more elements and
//! performs the writes; missing elements simply receive nothing. CSS owns the
//! visuals, keyed on `data-sticky-mode`, `data-expanded` and `hidden`.

use sticky_core::{HeaderPresentation, PanelKey};

use crate::selectors::{
    ARIA_EXPANDED_ATTR, COLLAPSE_ATTR, EXPANDED_ATTR, HIDDEN_ATTR, MODE_ATTR, PANEL_ATTR,
    PILL_ATTR, VIEWPORT_ATTR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Root,
    Panel(PanelKey),
    Pill(PanelKey),
    Collapse(PanelKey),
}

impl Target {
    /// Attribute that locates this target, or `None` for the root.
    #[must_use]
    pub const fn locator(self) -> Option<(&'static str, PanelKey)> {
        match self {
            Self::Root => None,
            Self::Panel(key) => Some((PANEL_ATTR, key)),
            Self::Pill(key) => Some((PILL_ATTR, key)),
            Self::Collapse(key) => Some((COLLAPSE_ATTR, key)),
        }
    }
}

/// Set `name` to `value`, or remove it when `value` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeWrite {
    pub target: Target,
    pub name: &'static str,
    pub value: Option<&'static str>,
}

const fn flag(on: bool) -> &'static str {
    if on { "true" } else { "false" }
}

const fn hidden_unless(visible: bool) -> Option<&'static str> {
    if visible { None } else { Some("") }
}

/// Every write needed to bring the DOM in line with `presentation`.
#[must_use]
pub fn attribute_writes(presentation: &HeaderPresentation) -> Vec<AttributeWrite> {
    let mut writes = vec![
        AttributeWrite {
            target: Target::Root,
            name: MODE_ATTR,
            value: Some(presentation.mode.as_str()),
        },
        AttributeWrite {
            target: Target::Root,
            name: VIEWPORT_ATTR,
            value: Some(if presentation.is_mobile {
                "mobile"
            } else {
                "desktop"
            }),
        },
    ];

    for key in PanelKey::ALL {
        let panel = presentation.panel(key);
        writes.extend([
            AttributeWrite {
                target: Target::Panel(key),
                name: EXPANDED_ATTR,
                value: Some(flag(panel.expanded)),
            },
            AttributeWrite {
                target: Target::Panel(key),
                name: HIDDEN_ATTR,
                value: hidden_unless(panel.panel_visible),
            },
            AttributeWrite {
                target: Target::Pill(key),
                name: HIDDEN_ATTR,
                value: hidden_unless(panel.pill_visible),
            },
            AttributeWrite {
                target: Target::Pill(key),
                name: ARIA_EXPANDED_ATTR,
                value: Some(flag(panel.expanded)),
            },
            AttributeWrite {
                target: Target::Collapse(key),
                name: HIDDEN_ATTR,
                value: hidden_unless(panel.collapse_visible),
            },
        ]);
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sticky_core::HeaderMode;
    use sticky_core::panel::PanelStates;

    fn value_of(writes: &[AttributeWrite], target: Target, name: &str) -> Option<&'static str> {
        writes
            .iter()
            .find(|w| w.target == target && w.name == name)
            .and_then(|w| w.value)
    }

    #[test]
    fn desktop_top_hides_pills_and_collapse_controls() {
        let p = HeaderPresentation::derive(HeaderMode::Top, &PanelStates::uniform(true), false);
        let writes = attribute_writes(&p);

        assert_eq!(value_of(&writes, Target::Root, MODE_ATTR), Some("top"));
        assert_eq!(value_of(&writes, Target::Root, VIEWPORT_ATTR), Some("desktop"));
        for key in PanelKey::ALL {
            assert_eq!(value_of(&writes, Target::Panel(key), EXPANDED_ATTR), Some("true"));
            assert_eq!(value_of(&writes, Target::Panel(key), HIDDEN_ATTR), None);
            assert_eq!(value_of(&writes, Target::Pill(key), HIDDEN_ATTR), Some(""));
            assert_eq!(value_of(&writes, Target::Collapse(key), HIDDEN_ATTR), Some(""));
        }
    }

    #[test]
    fn scrolled_with_one_panel_open() {
        let mut panels = PanelStates::uniform(false);
        panels.set_expanded(PanelKey::Filters, true);
        let p = HeaderPresentation::derive(HeaderMode::Scrolled, &panels, false);
        let writes = attribute_writes(&p);

        assert_eq!(value_of(&writes, Target::Root, MODE_ATTR), Some("scrolled"));
        assert_eq!(value_of(&writes, Target::Pill(PanelKey::Add), HIDDEN_ATTR), None);
        assert_eq!(
            value_of(&writes, Target::Pill(PanelKey::Add), ARIA_EXPANDED_ATTR),
            Some("false")
        );
        assert_eq!(value_of(&writes, Target::Panel(PanelKey::Add), HIDDEN_ATTR), Some(""));
        assert_eq!(
            value_of(&writes, Target::Collapse(PanelKey::Filters), HIDDEN_ATTR),
            None
        );
    }

    #[test]
    fn every_target_receives_writes() {
        let p = HeaderPresentation::derive(HeaderMode::Top, &PanelStates::uniform(false), true);
        let writes = attribute_writes(&p);
        assert_eq!(writes.len(), 2 + 5 * PanelKey::ALL.len());
        assert_eq!(Target::Pill(PanelKey::Add).locator(), Some((PILL_ATTR, PanelKey::Add)));
        assert_eq!(Target::Root.locator(), None);
    }
}
