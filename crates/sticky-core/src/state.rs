#![forbid(unsafe_code)]

//! Pure header state: mode plus per-panel flags, and the rules that force
//! panel values on mode entry, viewport crossings and manual collapse.
//!
//! Nothing here touches a host. Every mutator returns the panel changes it
//! made so the controller can present them and publish one event each.

use serde::Serialize;

use crate::mode::HeaderMode;
use crate::panel::{PanelKey, PanelState, PanelStates};
use crate::viewport::ViewportChange;

/// One applied panel change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelChange {
    pub panel: PanelKey,
    pub expanded: bool,
}

/// Why a manual collapse was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseRefusal {
    AlreadyCollapsed,
    /// Desktop `Top` mode pins both panels open.
    PinnedByTopMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderState {
    mode: HeaderMode,
    panels: PanelStates,
}

impl HeaderState {
    /// DOM-ready state: `Top`, panels expanded on desktop and collapsed on
    /// mobile.
    #[must_use]
    pub const fn initial(is_mobile: bool) -> Self {
        Self {
            mode: HeaderMode::Top,
            panels: PanelStates::uniform(!is_mobile),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> HeaderMode {
        self.mode
    }

    #[must_use]
    pub const fn panels(&self) -> &PanelStates {
        &self.panels
    }

    #[must_use]
    pub const fn is_expanded(&self, key: PanelKey) -> bool {
        self.panels.is_expanded(key)
    }

    /// Switch mode and run the entry actions. Returns the forced changes;
    /// empty when `to` is the current mode.
    pub fn enter_mode(&mut self, to: HeaderMode, is_mobile: bool) -> Vec<PanelChange> {
        if self.mode == to {
            return Vec::new();
        }
        self.mode = to;
        match to {
            HeaderMode::Top if is_mobile => Vec::new(),
            HeaderMode::Top => self.force_all(true),
            HeaderMode::Scrolled => self.force_all(false),
        }
    }

    /// Apply a breakpoint crossing. Only `Top` mode reacts.
    pub fn cross_viewport(&mut self, change: ViewportChange) -> Vec<PanelChange> {
        if !self.mode.is_top() {
            return Vec::new();
        }
        match change {
            ViewportChange::EnteredMobile => self.force_all(false),
            ViewportChange::EnteredDesktop => self.force_all(true),
        }
    }

    /// Expand one panel. `None` when it was already expanded.
    pub fn expand(&mut self, key: PanelKey) -> Option<PanelChange> {
        self.panels.set_expanded(key, true).then_some(PanelChange {
            panel: key,
            expanded: true,
        })
    }

    /// Collapse one panel, honoring the desktop `Top` pin. Mobile viewports
    /// may collapse in `Top`.
    pub fn collapse(&mut self, key: PanelKey, is_mobile: bool) -> Result<PanelChange, CollapseRefusal> {
        if !self.panels.is_expanded(key) {
            return Err(CollapseRefusal::AlreadyCollapsed);
        }
        if self.mode.is_top() && !is_mobile {
            return Err(CollapseRefusal::PinnedByTopMode);
        }
        self.panels.set_expanded(key, false);
        Ok(PanelChange {
            panel: key,
            expanded: false,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> HeaderSnapshot {
        HeaderSnapshot {
            mode: self.mode,
            panels: PanelsSnapshot {
                add: self.panels.get(PanelKey::Add),
                filters: self.panels.get(PanelKey::Filters),
            },
        }
    }

    fn force_all(&mut self, expanded: bool) -> Vec<PanelChange> {
        let keys: Vec<PanelKey> = self.panels.keys_not(expanded).collect();
        keys.into_iter()
            .map(|panel| {
                self.panels.set_expanded(panel, expanded);
                PanelChange { panel, expanded }
            })
            .collect()
    }
}

/// Read-only view returned by `getState()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderSnapshot {
    pub mode: HeaderMode,
    pub panels: PanelsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelsSnapshot {
    pub add: PanelState,
    pub filters: PanelState,
}
