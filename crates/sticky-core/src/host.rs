#![forbid(unsafe_code)]

//! Host capability interface.
//!
//! The embedding environment owns the document. The controller reads
//! geometry and writes presentation synchronously through [`HeaderHost`];
//! anything that needs the event loop (animation frames, throttle timers) is
//! handed back as a [`HostCommand`] for the host to schedule.

use core::time::Duration;

use crate::metrics::HeaderProbe;
use crate::panel::PanelKey;
use crate::presentation::HeaderPresentation;

/// Synchronous DOM access used by the controller.
///
/// Every element is optional on the host side. Implementations return
/// `None` / `false` for missing pieces and never fail.
pub trait HeaderHost {
    /// Read header geometry. `None` when the header root is absent.
    fn probe(&self) -> Option<HeaderProbe>;

    /// Apply panel, pill and collapse-control visibility.
    fn apply(&mut self, presentation: &HeaderPresentation);

    /// Focus the first focusable control inside `panel`. Returns `false`
    /// when the panel or a focusable control is missing.
    fn focus_first_control(&mut self, panel: PanelKey) -> bool;
}

/// Which throttle a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerChannel {
    Scroll,
    Resize,
}

/// Scheduling request for the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Call `on_animation_frame` on the next frame.
    RequestAnimationFrame,
    /// Call `on_timer(channel)` after `after` elapses.
    StartTimer { channel: TimerChannel, after: Duration },
}

impl<H: HeaderHost + ?Sized> HeaderHost for Box<H> {
    fn probe(&self) -> Option<HeaderProbe> {
        (**self).probe()
    }

    fn apply(&mut self, presentation: &HeaderPresentation) {
        (**self).apply(presentation);
    }

    fn focus_first_control(&mut self, panel: PanelKey) -> bool {
        (**self).focus_first_control(panel)
    }
}
