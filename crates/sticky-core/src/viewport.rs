#![forbid(unsafe_code)]

//! Mobile/desktop breakpoint tracking.

use serde::Serialize;

/// Default breakpoint width in CSS pixels; widths below it are mobile.
pub const DEFAULT_MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFlag {
    pub is_mobile: bool,
}

/// The media query and width rule for one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    width: u32,
}

impl Breakpoint {
    #[must_use]
    pub const fn new(width: u32) -> Self {
        Self { width }
    }

    #[must_use]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Media query matching the mobile side of the breakpoint.
    #[must_use]
    pub fn media_query(self) -> String {
        format!("(max-width: {}px)", self.width.saturating_sub(1))
    }

    /// Width rule used when no media query API is available.
    #[must_use]
    pub fn is_mobile_width(self, inner_width: f64) -> bool {
        inner_width.is_finite() && inner_width < f64::from(self.width)
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::new(DEFAULT_MOBILE_BREAKPOINT)
    }
}

/// Direction of a breakpoint crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    EnteredMobile,
    EnteredDesktop,
}

/// Holds the current [`ViewportFlag`] and reports crossings.
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    breakpoint: Breakpoint,
    flag: ViewportFlag,
}

impl ViewportAdapter {
    #[must_use]
    pub const fn new(breakpoint: Breakpoint, is_mobile: bool) -> Self {
        Self {
            breakpoint,
            flag: ViewportFlag { is_mobile },
        }
    }

    #[must_use]
    pub const fn flag(&self) -> ViewportFlag {
        self.flag
    }

    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.flag.is_mobile
    }

    /// Record a media-query result. Returns the crossing, if any.
    pub fn update(&mut self, is_mobile: bool) -> Option<ViewportChange> {
        if self.flag.is_mobile == is_mobile {
            return None;
        }
        self.flag.is_mobile = is_mobile;
        Some(if is_mobile {
            ViewportChange::EnteredMobile
        } else {
            ViewportChange::EnteredDesktop
        })
    }

    /// Record a window width when no media query API exists.
    pub fn update_from_width(&mut self, inner_width: f64) -> Option<ViewportChange> {
        if !inner_width.is_finite() || inner_width <= 0.0 {
            return None;
        }
        self.update(self.breakpoint.is_mobile_width(inner_width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_query_targets_widths_below_breakpoint() {
        assert_eq!(Breakpoint::default().media_query(), "(max-width: 767px)");
        assert!(Breakpoint::default().is_mobile_width(767.5));
        assert!(!Breakpoint::default().is_mobile_width(768.0));
    }

    #[test]
    fn update_reports_only_crossings() {
        let mut adapter = ViewportAdapter::new(Breakpoint::default(), false);
        assert_eq!(adapter.update(false), None);
        assert_eq!(adapter.update(true), Some(ViewportChange::EnteredMobile));
        assert!(adapter.is_mobile());
        assert_eq!(adapter.update(true), None);
        assert_eq!(adapter.update(false), Some(ViewportChange::EnteredDesktop));
    }

    #[test]
    fn width_fallback_ignores_garbage() {
        let mut adapter = ViewportAdapter::new(Breakpoint::default(), false);
        assert_eq!(adapter.update_from_width(0.0), None);
        assert_eq!(adapter.update_from_width(f64::NAN), None);
        assert_eq!(
            adapter.update_from_width(400.0),
            Some(ViewportChange::EnteredMobile)
        );
    }
}
