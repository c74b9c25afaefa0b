#![forbid(unsafe_code)]

//! A simulated document hosting the header.
//!
//! The header sits in normal flow at `document_top`, or pinned to the
//! viewport top while `Scrolled` when `fixed_when_scrolled` is set. Its
//! height is a fixed chrome height plus the height of every visible panel,
//! so applying a presentation changes the geometry later probes observe, the
//! same way a real layout reflows.

use std::cell::Cell;

use sticky_core::{HeaderHost, HeaderMode, HeaderPresentation, HeaderProbe, PanelKey};

#[derive(Debug, Clone)]
pub struct SimulatedPage {
    /// `false` models a page without the header root.
    pub header_present: bool,
    pub document_top: f64,
    /// Height with both panels collapsed.
    pub chrome_height: f64,
    /// Extra height each expanded panel adds.
    pub panel_height: f64,
    pub scroll_y: f64,
    /// Model `position: fixed` in `Scrolled`: the header leaves the flow and
    /// its offset chain sums to zero.
    pub fixed_when_scrolled: bool,
    /// Whether each panel contains a focusable control.
    pub focusable: [bool; 2],
    /// Forces the next probes to report this height (reflow glitches).
    pub height_override: Option<f64>,
    /// Every presentation applied, oldest first.
    pub applied: Vec<HeaderPresentation>,
    /// Every panel that received focus, oldest first.
    pub focused: Vec<PanelKey>,
    /// Number of probes taken.
    pub probes: Cell<usize>,
}

impl Default for SimulatedPage {
    fn default() -> Self {
        Self {
            header_present: true,
            document_top: 64.0,
            chrome_height: 40.0,
            panel_height: 40.0,
            scroll_y: 0.0,
            fixed_when_scrolled: false,
            focusable: [true, true],
            height_override: None,
            applied: Vec::new(),
            focused: Vec::new(),
            probes: Cell::new(0),
        }
    }
}

impl SimulatedPage {
    /// Page without a header root.
    #[must_use]
    pub fn without_header() -> Self {
        Self {
            header_present: false,
            ..Self::default()
        }
    }

    /// Last presentation applied, if any.
    #[must_use]
    pub fn presentation(&self) -> Option<&HeaderPresentation> {
        self.applied.last()
    }

    /// Current rendered header height.
    #[must_use]
    pub fn header_height(&self) -> f64 {
        if let Some(height) = self.height_override {
            return height;
        }
        let expanded = self.presentation().map_or(0, |p| {
            PanelKey::ALL
                .into_iter()
                .filter(|key| p.panel(*key).panel_visible)
                .count()
        });
        self.chrome_height + self.panel_height * expanded as f64
    }

    /// Whether the pill for `key` is currently visible.
    #[must_use]
    pub fn pill_visible(&self, key: PanelKey) -> bool {
        self.presentation()
            .is_some_and(|p| p.panel(key).pill_visible)
    }
}

impl HeaderHost for SimulatedPage {
    fn probe(&self) -> Option<HeaderProbe> {
        if !self.header_present {
            return None;
        }
        self.probes.set(self.probes.get() + 1);
        let height = self.header_height();
        let floating = self.fixed_when_scrolled
            && self
                .presentation()
                .is_some_and(|p| p.mode == HeaderMode::Scrolled);
        let (offset, top) = if floating {
            (0.0, 0.0)
        } else {
            (self.document_top, self.document_top - self.scroll_y)
        };
        Some(HeaderProbe {
            offset_chain: vec![offset],
            bounding_top: top,
            bounding_bottom: top + height,
            height,
            scroll_y: self.scroll_y,
        })
    }

    fn apply(&mut self, presentation: &HeaderPresentation) {
        if self.header_present {
            self.applied.push(*presentation);
        }
    }

    fn focus_first_control(&mut self, panel: PanelKey) -> bool {
        let index = PanelKey::ALL
            .iter()
            .position(|key| *key == panel)
            .unwrap_or(0);
        if !self.header_present || !self.focusable[index] {
            return false;
        }
        self.focused.push(panel);
        true
    }
}
