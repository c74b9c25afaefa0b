#![forbid(unsafe_code)]

//! Header geometry cache and the re-expand hysteresis buffer.
//!
//! The header changes height as panels expand and collapse, so thresholds
//! derived from a single live reading would drift while the user scrolls.
//! [`MetricsTracker`] keeps the last known-good expanded and collapsed
//! heights separately and only refreshes each one from a reading taken in the
//! matching panel configuration.
//!
//! # Invariants
//!
//! - `expanded_height` is only overwritten while every panel is expanded
//!   (or the request is forced).
//! - `collapsed_height` is only overwritten while no panel is expanded
//!   (or the request is forced).
//! - Zero, negative and non-finite heights never replace a cached value.
//! - `document_top` is only refreshed from readings taken in `Top` mode,
//!   where the header sits at its natural position in the flow.
//! - `expand_buffer` always lies in `[min_buffer, max_buffer]`.

use core::ops::BitOr;

use serde::Serialize;
use tracing::trace;

use crate::mode::HeaderMode;
use crate::panel::PanelStates;

/// Lower bound of the re-expand buffer, in CSS pixels.
pub const DEFAULT_MIN_BUFFER: f64 = 24.0;
/// Upper bound of the re-expand buffer, in CSS pixels.
pub const DEFAULT_MAX_BUFFER: f64 = 160.0;
/// Share of the expanded height that feeds the buffer.
pub const DEFAULT_BUFFER_RATIO: f64 = 0.25;

/// Bounds used to derive [`Metrics::expand_buffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferPolicy {
    pub min: f64,
    pub max: f64,
    pub ratio: f64,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BUFFER,
            max: DEFAULT_MAX_BUFFER,
            ratio: DEFAULT_BUFFER_RATIO,
        }
    }
}

impl BufferPolicy {
    /// `clamp(max(min, collapsed, expanded * ratio), min, max)`.
    ///
    /// Written without `f64::clamp` so an inverted policy degrades to `max`
    /// instead of panicking.
    #[must_use]
    pub fn buffer_for(&self, expanded_height: f64, collapsed_height: f64) -> f64 {
        let raw = self
            .min
            .max(collapsed_height)
            .max(expanded_height * self.ratio);
        raw.max(self.min).min(self.max)
    }
}

/// One geometry reading of the header root, taken by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderProbe {
    /// `offsetTop` of the header and of each `offsetParent` above it.
    pub offset_chain: Vec<f64>,
    /// `getBoundingClientRect().top`.
    pub bounding_top: f64,
    /// `getBoundingClientRect().bottom`.
    pub bounding_bottom: f64,
    /// Rendered height of the header.
    pub height: f64,
    /// `window.scrollY` at the time of the reading.
    pub scroll_y: f64,
}

impl HeaderProbe {
    /// Document-relative top of the header.
    #[must_use]
    pub fn document_top(&self) -> f64 {
        document_top(
            self.offset_chain.iter().copied(),
            self.bounding_top,
            self.scroll_y,
        )
    }
}

/// Sum an `offsetTop` chain, falling back to `bounding_top + scroll_y` when
/// the chain yields nothing usable.
#[must_use]
pub fn document_top(
    offset_chain: impl IntoIterator<Item = f64>,
    bounding_top: f64,
    scroll_y: f64,
) -> f64 {
    let summed: f64 = offset_chain.into_iter().filter(|v| v.is_finite()).sum();
    if summed != 0.0 {
        return summed;
    }
    let fallback = bounding_top + scroll_y;
    if fallback.is_finite() { fallback } else { 0.0 }
}

/// Which heights a measurement pass may refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasureRequest {
    pub expanded: bool,
    pub collapsed: bool,
    /// Bypass the panel-configuration guard.
    pub force: bool,
}

impl MeasureRequest {
    pub const EXPANDED: Self = Self {
        expanded: true,
        collapsed: false,
        force: false,
    };
    pub const COLLAPSED: Self = Self {
        expanded: false,
        collapsed: true,
        force: false,
    };
    pub const BOTH: Self = Self {
        expanded: true,
        collapsed: true,
        force: false,
    };

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.expanded && !self.collapsed
    }
}

impl BitOr for MeasureRequest {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            expanded: self.expanded || rhs.expanded,
            collapsed: self.collapsed || rhs.collapsed,
            force: self.force || rhs.force,
        }
    }
}

/// Cached header geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub document_top: f64,
    pub expanded_height: f64,
    pub collapsed_height: f64,
    pub expand_buffer: f64,
}

/// What a measurement pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsUpdate {
    pub document_top: bool,
    pub expanded_height: bool,
    pub collapsed_height: bool,
}

impl MetricsUpdate {
    #[must_use]
    pub const fn any(self) -> bool {
        self.document_top || self.expanded_height || self.collapsed_height
    }
}

fn usable_height(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Owns [`Metrics`] and refreshes it from [`HeaderProbe`] readings.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    metrics: Metrics,
    policy: BufferPolicy,
}

impl MetricsTracker {
    #[must_use]
    pub fn new(policy: BufferPolicy) -> Self {
        Self {
            metrics: Metrics {
                document_top: 0.0,
                expanded_height: 0.0,
                collapsed_height: 0.0,
                expand_buffer: policy.buffer_for(0.0, 0.0),
            },
            policy,
        }
    }

    #[must_use]
    pub const fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Apply one reading under `request`, given the mode and panel
    /// configuration the reading was taken in.
    ///
    /// A `Scrolled` header may be taken out of the flow (`position: fixed`),
    /// so its offsets say nothing about the resting position.
    pub fn update(
        &mut self,
        request: MeasureRequest,
        probe: &HeaderProbe,
        mode: HeaderMode,
        panels: &PanelStates,
    ) -> MetricsUpdate {
        let mut update = MetricsUpdate::default();

        let top = probe.document_top();
        if mode.is_top() && top.is_finite() && top != self.metrics.document_top {
            self.metrics.document_top = top;
            update.document_top = true;
        }

        let height = probe.height;
        if request.expanded && (request.force || panels.all_expanded()) {
            if usable_height(height) {
                update.expanded_height = height != self.metrics.expanded_height;
                self.metrics.expanded_height = height;
            } else {
                trace!(height, "rejected expanded height reading");
            }
        }
        if request.collapsed && (request.force || panels.none_expanded()) {
            if usable_height(height) {
                update.collapsed_height = height != self.metrics.collapsed_height;
                self.metrics.collapsed_height = height;
            } else {
                trace!(height, "rejected collapsed height reading");
            }
        }

        self.metrics.expand_buffer = self
            .policy
            .buffer_for(self.metrics.expanded_height, self.metrics.collapsed_height);
        trace!(
            document_top = self.metrics.document_top,
            expanded = self.metrics.expanded_height,
            collapsed = self.metrics.collapsed_height,
            buffer = self.metrics.expand_buffer,
            "metrics refreshed"
        );
        update
    }
}
