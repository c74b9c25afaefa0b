#![forbid(unsafe_code)]

//! `Top` / `Scrolled` header mode and the transition rule.
//!
//! The two directions use different signals on purpose:
//!
//! - `Top -> Scrolled` is geometric: the header's rendered bottom edge has
//!   reached the viewport top. It does not depend on cached metrics, so it
//!   stays correct while the header grows or shrinks in `Top`.
//! - `Scrolled -> Top` compares the scroll position against
//!   `document_top + expand_buffer`, a cached threshold that sits above the
//!   header's natural resting position.
//!
//! A collapse is only accepted when the scroll position is already past the
//! expand threshold, which rules out a transition that would immediately
//! qualify for the reverse one.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Default tolerance for "bottom edge at the viewport top", in CSS pixels.
pub const DEFAULT_COLLAPSE_TOLERANCE: f64 = 2.0;

/// Header presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Page at (or near) the top; panels render inline.
    #[default]
    Top,
    /// Page scrolled past the header; panels render as pills.
    Scrolled,
}

impl HeaderMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Scrolled => "scrolled",
        }
    }

    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::Top)
    }
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown header mode: {0:?}")]
pub struct ParseHeaderModeError(pub String);

impl FromStr for HeaderMode {
    type Err = ParseHeaderModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Self::Top),
            "scrolled" => Ok(Self::Scrolled),
            other => Err(ParseHeaderModeError(other.to_owned())),
        }
    }
}

/// Scroll-space thresholds derived from the cached metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// `document_top + expand_buffer`. `Scrolled -> Top` once
    /// `scroll_top <= expand_at`; `Top -> Scrolled` only past it.
    pub expand_at: f64,
    /// How close to the viewport top the header bottom must be to count as
    /// reached.
    pub tolerance: f64,
}

impl Thresholds {
    #[must_use]
    pub fn new(metrics: &Metrics, tolerance: f64) -> Self {
        Self {
            expand_at: metrics.document_top + metrics.expand_buffer,
            tolerance,
        }
    }
}

/// Inputs for one mode evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Current document scroll offset.
    pub scroll_top: f64,
    /// Header `getBoundingClientRect().bottom` at the same instant.
    pub header_bottom: f64,
}

/// Evaluate the transition rule. Returns the next mode when a transition is
/// due, `None` otherwise. At most one transition per call.
///
/// `Top -> Scrolled` needs both `header_bottom <= tolerance` and
/// `scroll_top > expand_at`. The second condition means a header whose
/// bottom has reached the viewport top still stays in `Top` while the
/// scroll position is inside the re-expand buffer. This happens for headers
/// no taller than their buffer, typically mobile `Top` with both panels
/// collapsed. Without it the same sample would immediately qualify for
/// `Scrolled -> Top`.
#[must_use]
pub fn next_mode(
    current: HeaderMode,
    sample: ScrollSample,
    thresholds: &Thresholds,
) -> Option<HeaderMode> {
    match current {
        HeaderMode::Top => {
            let bottom_reached = sample.header_bottom <= thresholds.tolerance;
            (bottom_reached && sample.scroll_top > thresholds.expand_at)
                .then_some(HeaderMode::Scrolled)
        }
        HeaderMode::Scrolled => {
            (sample.scroll_top <= thresholds.expand_at).then_some(HeaderMode::Top)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        let metrics = Metrics {
            document_top: 64.0,
            expanded_height: 120.0,
            collapsed_height: 40.0,
            expand_buffer: 40.0,
        };
        Thresholds::new(&metrics, 2.0)
    }

    #[test]
    fn top_collapses_once_header_bottom_passes_viewport_top() {
        let t = thresholds();
        let below = ScrollSample {
            scroll_top: 150.0,
            header_bottom: 34.0,
        };
        assert_eq!(next_mode(HeaderMode::Top, below, &t), None);

        let at_edge = ScrollSample {
            scroll_top: 182.0,
            header_bottom: 2.0,
        };
        assert_eq!(
            next_mode(HeaderMode::Top, at_edge, &t),
            Some(HeaderMode::Scrolled)
        );
    }

    #[test]
    fn top_does_not_collapse_inside_expand_buffer() {
        // A header shorter than its own buffer cannot collapse until the
        // scroll position clears the re-expand threshold.
        let t = thresholds();
        let sample = ScrollSample {
            scroll_top: 100.0,
            header_bottom: -10.0,
        };
        assert_eq!(next_mode(HeaderMode::Top, sample, &t), None);
    }

    #[test]
    fn scrolled_expands_inside_buffer() {
        let t = thresholds();
        let inside = ScrollSample {
            scroll_top: 104.0,
            header_bottom: -300.0,
        };
        assert_eq!(
            next_mode(HeaderMode::Scrolled, inside, &t),
            Some(HeaderMode::Top)
        );
        let outside = ScrollSample {
            scroll_top: 104.5,
            header_bottom: -300.0,
        };
        assert_eq!(next_mode(HeaderMode::Scrolled, outside, &t), None);
    }

    #[test]
    fn expand_threshold_is_document_top_plus_buffer() {
        let t = thresholds();
        assert_eq!(t.expand_at, 104.0);
        assert_eq!(t.tolerance, 2.0);
    }

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("scrolled".parse::<HeaderMode>(), Ok(HeaderMode::Scrolled));
        assert_eq!(HeaderMode::Top.to_string(), "top");
        assert!("middle".parse::<HeaderMode>().is_err());
    }
}
