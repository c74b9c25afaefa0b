#![forbid(unsafe_code)]

//! Scenario driver: plays the role of the browser event loop.
//!
//! The driver owns a [`StickyHeader`] over a [`SimulatedPage`], a
//! [`DeterministicClock`], the outstanding throttle timers and the pending
//! animation frame. Each helper forwards one native event, then routes the
//! controller's [`HostCommand`]s exactly once.

use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use sticky_core::{
    ChangeSource, HeaderEvent, HeaderMode, HostCommand, PanelEvent, PanelEventKind, PanelKey,
    StickyConfig, StickyHeader, TimerChannel, ViewportSize,
};
use tracing::trace;

use crate::clock::DeterministicClock;
use crate::page::SimulatedPage;

/// Scroll events per simulated gesture step.
const SCROLL_STEP_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    due: Duration,
    channel: TimerChannel,
}

pub struct Driver {
    header: StickyHeader<SimulatedPage>,
    clock: DeterministicClock,
    timers: Vec<PendingTimer>,
    frame_pending: bool,
    frames_delivered: usize,
    events: Rc<RefCell<Vec<HeaderEvent>>>,
}

impl Driver {
    /// Desktop page (1280px wide) with default config.
    #[must_use]
    pub fn desktop(page: SimulatedPage) -> Self {
        Self::new(page, StickyConfig::default(), false)
    }

    /// Mobile page (400px wide) with default config.
    #[must_use]
    pub fn mobile(page: SimulatedPage) -> Self {
        Self::new(page, StickyConfig::default(), true)
    }

    /// Build the controller at DOM-ready and settle the first frame.
    #[must_use]
    pub fn new(page: SimulatedPage, config: StickyConfig, is_mobile: bool) -> Self {
        let mut header = StickyHeader::new(page, config, is_mobile);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        header.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
        let mut driver = Self {
            header,
            clock: DeterministicClock::new(),
            timers: Vec::new(),
            frame_pending: false,
            frames_delivered: 0,
            events,
        };
        driver.route_commands();
        driver.frame();
        driver
    }

    #[must_use]
    pub const fn header(&self) -> &StickyHeader<SimulatedPage> {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut StickyHeader<SimulatedPage> {
        &mut self.header
    }

    #[must_use]
    pub fn page(&self) -> &SimulatedPage {
        self.header.host()
    }

    pub fn page_mut(&mut self) -> &mut SimulatedPage {
        self.header.host_mut()
    }

    #[must_use]
    pub fn mode(&self) -> HeaderMode {
        self.header.mode()
    }

    #[must_use]
    pub fn is_expanded(&self, panel: PanelKey) -> bool {
        let state = self.header.state();
        match panel {
            PanelKey::Add => state.panels.add.expanded,
            PanelKey::Filters => state.panels.filters.expanded,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub const fn frames_delivered(&self) -> usize {
        self.frames_delivered
    }

    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    #[must_use]
    pub fn timers_pending(&self) -> usize {
        self.timers.len()
    }

    /// Remove and return every event published so far.
    pub fn take_events(&mut self) -> Vec<HeaderEvent> {
        core::mem::take(&mut *self.events.borrow_mut())
    }

    /// Panel events of `kind` among `events`.
    #[must_use]
    pub fn panel_events(events: &[HeaderEvent], kind: PanelEventKind) -> Vec<PanelEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                HeaderEvent::Panel(panel) if panel.kind == kind => Some(panel.clone()),
                _ => None,
            })
            .collect()
    }

    // ── native events ────────────────────────────────────────────────────

    /// One scroll event at the current time.
    pub fn scroll_event(&mut self, scroll_y: f64) {
        self.page_mut().scroll_y = scroll_y;
        let now = self.clock.now();
        self.header.on_scroll(now, scroll_y);
        self.route_commands();
    }

    /// Scroll smoothly to `target` in `steps` events, then let throttles and
    /// frames settle.
    pub fn scroll_to(&mut self, target: f64, steps: u32) {
        let start = self.page().scroll_y;
        let steps = steps.max(1);
        for i in 1..=steps {
            let y = start + (target - start) * f64::from(i) / f64::from(steps);
            self.scroll_event(y);
            self.advance(Duration::from_millis(SCROLL_STEP_MS));
            self.frame();
        }
        self.settle();
    }

    /// Jump straight to `target` (one scroll event) and settle.
    pub fn jump_to(&mut self, target: f64) {
        self.advance(self.header.config().scroll_interval());
        self.scroll_event(target);
        self.settle();
    }

    /// Resize the window. Media-query crossings are reported separately with
    /// [`Driver::media_query`], as a browser would.
    pub fn resize(&mut self, width: f64, height: f64) {
        let now = self.clock.now();
        self.header.on_resize(now, ViewportSize { width, height });
        self.route_commands();
    }

    /// Resize and deliver the media-query result for the new width.
    pub fn resize_across_breakpoint(&mut self, width: f64, height: f64) {
        let mobile = self.header.config().breakpoint().is_mobile_width(width);
        self.media_query(mobile);
        self.resize(width, height);
        self.settle();
    }

    pub fn media_query(&mut self, is_mobile: bool) {
        self.header.on_viewport_change(is_mobile);
        self.route_commands();
    }

    pub fn click_pill(&mut self, panel: PanelKey) {
        self.header.on_pill_click(panel);
        self.route_commands();
    }

    pub fn click_collapse(&mut self, panel: PanelKey) {
        self.header.on_collapse_click(panel);
        self.route_commands();
    }

    pub fn focus_in(&mut self, panel: PanelKey) {
        self.header.on_focus_in(panel);
        self.route_commands();
    }

    pub fn header_resized(&mut self) {
        self.header.on_header_resized();
        self.route_commands();
    }

    pub fn expand(&mut self, panel: PanelKey, source: ChangeSource) -> bool {
        let changed = self.header.expand_panel(panel, source);
        self.route_commands();
        changed
    }

    pub fn collapse(&mut self, panel: PanelKey, source: ChangeSource) -> bool {
        let changed = self.header.collapse_panel(panel, source);
        self.route_commands();
        changed
    }

    // ── event loop ───────────────────────────────────────────────────────

    /// Deliver the pending animation frame, if any.
    pub fn frame(&mut self) {
        if !self.frame_pending {
            return;
        }
        self.frame_pending = false;
        self.frames_delivered += 1;
        self.header.on_animation_frame();
        self.route_commands();
    }

    /// Advance the clock, firing due timers in deadline order.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.clock.now().saturating_add(dt);
        loop {
            self.timers.sort_by_key(|t| t.due);
            let Some(next) = self.timers.first().copied() else {
                break;
            };
            if next.due > target {
                break;
            }
            self.timers.remove(0);
            self.clock.set(next.due);
            trace!(channel = ?next.channel, due_ms = next.due.as_millis() as u64, "timer fired");
            self.header.on_timer(next.due, next.channel);
            self.route_commands();
        }
        self.clock.set(target);
    }

    /// Run frames and timers until nothing is outstanding.
    pub fn settle(&mut self) {
        for _ in 0..64 {
            if !self.frame_pending && self.timers.is_empty() {
                return;
            }
            self.frame();
            let wait = self
                .timers
                .iter()
                .map(|t| t.due.saturating_sub(self.clock.now()))
                .max()
                .unwrap_or(Duration::ZERO);
            self.advance(wait);
        }
    }

    fn route_commands(&mut self) {
        for command in self.header.drain_commands() {
            match command {
                HostCommand::RequestAnimationFrame => self.frame_pending = true,
                HostCommand::StartTimer { channel, after } => {
                    self.timers.push(PendingTimer {
                        due: self.clock.now().saturating_add(after),
                        channel,
                    });
                }
            }
        }
    }
}
