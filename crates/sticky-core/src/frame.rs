#![forbid(unsafe_code)]

//! Next-animation-frame work coalescing.
//!
//! Measurement reads layout and focus moves can trigger scrolling, so both
//! wait for the next animation frame. Requests made before that frame merge
//! into one [`FrameWork`] batch and the host is asked for a single frame.

use crate::metrics::MeasureRequest;
use crate::panel::PanelKey;

/// Work to perform on the next animation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameWork {
    pub measure: MeasureRequest,
    /// Panel whose first focusable control should receive focus.
    pub focus: Option<PanelKey>,
    /// Re-run the mode evaluation after measuring.
    pub evaluate: bool,
}

impl FrameWork {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.measure.is_empty() && self.focus.is_none() && !self.evaluate
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: FrameWork,
    requested: bool,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a measurement request. Returns `true` when the host must
    /// request a new animation frame.
    pub fn request_measure(&mut self, request: MeasureRequest) -> bool {
        self.pending.measure = self.pending.measure | request;
        self.arm()
    }

    /// Schedule a focus move; the latest request wins.
    pub fn request_focus(&mut self, panel: PanelKey) -> bool {
        self.pending.focus = Some(panel);
        self.arm()
    }

    pub fn request_evaluate(&mut self) -> bool {
        self.pending.evaluate = true;
        self.arm()
    }

    /// The frame arrived: take the batch and clear the request.
    pub fn take(&mut self) -> FrameWork {
        self.requested = false;
        core::mem::take(&mut self.pending)
    }

    fn arm(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        true
    }
}
