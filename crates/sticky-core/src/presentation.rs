#![forbid(unsafe_code)]

//! Pure mapping from header state to what the host should show.
//!
//! The controller never touches elements directly. It derives a
//! [`HeaderPresentation`] and hands it to [`crate::host::HeaderHost::apply`];
//! the host decides how that maps onto attributes and classes.

use crate::mode::HeaderMode;
use crate::panel::{PanelKey, PanelStates};

/// Visibility of one panel's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPresentation {
    pub expanded: bool,
    pub panel_visible: bool,
    pub pill_visible: bool,
    /// The "−" control. Never shown for a panel pinned open by desktop
    /// `Top` mode.
    pub collapse_visible: bool,
}

impl PanelPresentation {
    #[must_use]
    pub const fn derive(expanded: bool, mode: HeaderMode, is_mobile: bool) -> Self {
        Self {
            expanded,
            panel_visible: expanded,
            pill_visible: !expanded,
            collapse_visible: expanded && (!mode.is_top() || is_mobile),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPresentation {
    pub mode: HeaderMode,
    pub is_mobile: bool,
    panels: [PanelPresentation; 2],
}

impl HeaderPresentation {
    #[must_use]
    pub fn derive(mode: HeaderMode, panels: &PanelStates, is_mobile: bool) -> Self {
        let each = |key| PanelPresentation::derive(panels.is_expanded(key), mode, is_mobile);
        Self {
            mode,
            is_mobile,
            panels: [each(PanelKey::Add), each(PanelKey::Filters)],
        }
    }

    #[must_use]
    pub const fn panel(&self, key: PanelKey) -> PanelPresentation {
        match key {
            PanelKey::Add => self.panels[0],
            PanelKey::Filters => self.panels[1],
        }
    }
}
