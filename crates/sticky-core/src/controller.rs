#![forbid(unsafe_code)]

//! [`StickyHeader`]: the controller that ties state, metrics, viewport,
//! throttles and the event bus to one [`HeaderHost`].
//!
//! # Host contract
//!
//! 1. Construct at DOM-ready with the current media-query result.
//! 2. Forward native events: `on_scroll`, `on_resize`, `on_viewport_change`,
//!    `on_header_resized`, `on_focus_in`, `on_pill_click`,
//!    `on_collapse_click`.
//! 3. After every call, drain [`StickyHeader::drain_commands`] and schedule
//!    what it asks for; deliver `on_animation_frame` / `on_timer` back.
//!
//! Every operation completes its state change, presentation and event
//! publication before returning.

use core::time::Duration;

use tracing::{debug, trace};

use crate::config::StickyConfig;
use crate::events::{EventBus, HeaderEvent, ModeChange, PanelEvent, PanelEventKind, SubscriptionId};
use crate::frame::FrameScheduler;
use crate::host::{HeaderHost, HostCommand, TimerChannel};
use crate::metrics::{MeasureRequest, Metrics, MetricsTracker};
use crate::mode::{HeaderMode, ScrollSample, Thresholds, next_mode};
use crate::panel::{ChangeSource, PanelKey};
use crate::presentation::HeaderPresentation;
use crate::state::{CollapseRefusal, HeaderSnapshot, HeaderState, PanelChange};
use crate::throttle::{Throttle, ThrottleDecision};
use crate::viewport::{ViewportAdapter, ViewportChange, ViewportFlag};

/// Window size carried through the resize throttle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

pub struct StickyHeader<H> {
    host: H,
    config: StickyConfig,
    state: HeaderState,
    viewport: ViewportAdapter,
    metrics: MetricsTracker,
    frames: FrameScheduler,
    scroll_throttle: Throttle<f64>,
    resize_throttle: Throttle<ViewportSize>,
    bus: EventBus,
    commands: Vec<HostCommand>,
    track_viewport_width: bool,
}

impl<H: core::fmt::Debug> core::fmt::Debug for StickyHeader<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StickyHeader")
            .field("host", &self.host)
            .field("state", &self.state)
            .field("viewport", &self.viewport.flag())
            .field("metrics", &self.metrics.metrics())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<H: HeaderHost> StickyHeader<H> {
    /// Build the controller in its DOM-ready state and present it.
    ///
    /// No panel events are published for the initial state. A first
    /// measurement and scroll evaluation are queued for the next frame.
    pub fn new(host: H, config: StickyConfig, is_mobile: bool) -> Self {
        let mut header = Self {
            host,
            viewport: ViewportAdapter::new(config.breakpoint(), is_mobile),
            metrics: MetricsTracker::new(config.buffer_policy()),
            scroll_throttle: Throttle::new(config.scroll_interval()),
            resize_throttle: Throttle::new(config.resize_interval()),
            config,
            state: HeaderState::initial(is_mobile),
            frames: FrameScheduler::new(),
            bus: EventBus::new(),
            commands: Vec::new(),
            track_viewport_width: false,
        };
        debug!(is_mobile, "sticky header initialised");
        header.present();
        header.schedule_measure(header.mode_measure());
        if header.frames.request_evaluate() {
            header.commands.push(HostCommand::RequestAnimationFrame);
        }
        header
    }

    /// Derive the viewport flag from resize widths instead of a media query.
    /// Hosts without `matchMedia` enable this.
    pub fn track_viewport_width(&mut self, enabled: bool) {
        self.track_viewport_width = enabled;
    }

    // ── read access ───────────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> HeaderSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub const fn mode(&self) -> HeaderMode {
        self.state.mode()
    }

    #[must_use]
    pub const fn metrics(&self) -> Metrics {
        self.metrics.metrics()
    }

    #[must_use]
    pub const fn viewport(&self) -> ViewportFlag {
        self.viewport.flag()
    }

    #[must_use]
    pub const fn config(&self) -> &StickyConfig {
        &self.config
    }

    /// Thresholds the next mode evaluation will use.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(&self.metrics.metrics(), self.config.collapse_tolerance_px)
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Take the scheduling requests produced since the last drain.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        core::mem::take(&mut self.commands)
    }

    // ── subscriptions ─────────────────────────────────────────────────────

    pub fn on_panel_expanded(
        &mut self,
        panel: Option<PanelKey>,
        f: impl FnMut(&PanelEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.on_panel_expanded(panel, f)
    }

    pub fn on_panel_collapsed(
        &mut self,
        panel: Option<PanelKey>,
        f: impl FnMut(&PanelEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.on_panel_collapsed(panel, f)
    }

    pub fn on_mode_changed(&mut self, f: impl FnMut(&ModeChange) + 'static) -> SubscriptionId {
        self.bus.on_mode_changed(f)
    }

    pub fn subscribe_all(&mut self, f: impl FnMut(&HeaderEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe_all(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ── public mutators ───────────────────────────────────────────────────

    /// Expand `panel`. Returns `false` when it was already expanded.
    pub fn expand_panel(&mut self, panel: PanelKey, source: ChangeSource) -> bool {
        let Some(change) = self.state.expand(panel) else {
            return false;
        };
        if self.state.mode().is_top() {
            self.schedule_measure(self.mode_measure());
        }
        self.commit(vec![change], &source);
        true
    }

    /// Collapse `panel`. Returns `false` when it was already collapsed or is
    /// pinned open by desktop `Top` mode.
    pub fn collapse_panel(&mut self, panel: PanelKey, source: ChangeSource) -> bool {
        let change = match self.state.collapse(panel, self.viewport.is_mobile()) {
            Ok(change) => change,
            Err(CollapseRefusal::PinnedByTopMode) => {
                trace!(%panel, "collapse refused: pinned by top mode");
                return false;
            }
            Err(CollapseRefusal::AlreadyCollapsed) => return false,
        };
        if self.state.mode().is_top() {
            self.schedule_measure(self.mode_measure());
        }
        self.commit(vec![change], &source);
        true
    }

    // ── native event entry points ─────────────────────────────────────────

    /// Scroll event with the current document scroll offset.
    pub fn on_scroll(&mut self, now: Duration, scroll_top: f64) {
        match self.scroll_throttle.call(now, scroll_top) {
            ThrottleDecision::Run(scroll_top) => {
                self.evaluate(scroll_top);
            }
            ThrottleDecision::Deferred { arm_timer } => {
                self.arm_timer(TimerChannel::Scroll, arm_timer);
            }
        }
    }

    /// Window resize.
    pub fn on_resize(&mut self, now: Duration, size: ViewportSize) {
        match self.resize_throttle.call(now, size) {
            ThrottleDecision::Run(size) => self.handle_resize(size),
            ThrottleDecision::Deferred { arm_timer } => {
                self.arm_timer(TimerChannel::Resize, arm_timer);
            }
        }
    }

    /// A timer started by [`HostCommand::StartTimer`] expired.
    pub fn on_timer(&mut self, now: Duration, channel: TimerChannel) {
        match channel {
            TimerChannel::Scroll => {
                if let Some(scroll_top) = self.scroll_throttle.fire(now) {
                    self.evaluate(scroll_top);
                }
            }
            TimerChannel::Resize => {
                if let Some(size) = self.resize_throttle.fire(now) {
                    self.handle_resize(size);
                }
            }
        }
    }

    /// Media-query result changed (or was re-reported).
    pub fn on_viewport_change(&mut self, is_mobile: bool) {
        let change = self.viewport.update(is_mobile);
        self.cross_viewport(change);
    }

    fn cross_viewport(&mut self, change: Option<ViewportChange>) {
        let Some(change) = change else {
            return;
        };
        debug!(?change, mode = %self.state.mode(), "viewport breakpoint crossed");
        let changes = self.state.cross_viewport(change);
        self.schedule_measure(self.mode_measure());
        // Collapse-control visibility depends on the flag even without
        // panel changes.
        self.commit(changes, &ChangeSource::ViewportChange);
    }

    /// The header element changed size (`ResizeObserver`).
    pub fn on_header_resized(&mut self) {
        self.schedule_measure(self.mode_measure());
    }

    /// Focus entered a control inside `panel`.
    pub fn on_focus_in(&mut self, panel: PanelKey) {
        self.expand_panel(panel, ChangeSource::Focus);
    }

    /// The pill for `panel` was activated. Focus moves into the panel on the
    /// next frame, after the expansion has been laid out.
    pub fn on_pill_click(&mut self, panel: PanelKey) {
        self.expand_panel(panel, ChangeSource::Pill);
        if self.frames.request_focus(panel) {
            self.commands.push(HostCommand::RequestAnimationFrame);
        }
    }

    /// A collapse control for `panel` was activated.
    pub fn on_collapse_click(&mut self, panel: PanelKey) {
        self.collapse_panel(panel, ChangeSource::CollapseButton);
    }

    /// The animation frame requested by [`HostCommand::RequestAnimationFrame`].
    pub fn on_animation_frame(&mut self) {
        let work = self.frames.take();
        if work.is_empty() {
            return;
        }

        let probe = self.host.probe();
        if let Some(probe) = probe.as_ref()
            && !work.measure.is_empty()
        {
            let update = self.metrics.update(
                work.measure,
                probe,
                self.state.mode(),
                self.state.panels(),
            );
            if update.any() {
                trace!(?update, "metrics changed");
            }
        }

        if work.evaluate
            && let Some(probe) = probe
        {
            self.evaluate_with(ScrollSample {
                scroll_top: probe.scroll_y,
                header_bottom: probe.bounding_bottom,
            });
        }

        if let Some(panel) = work.focus
            && !self.host.focus_first_control(panel)
        {
            trace!(%panel, "no focusable control in panel");
        }
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn handle_resize(&mut self, size: ViewportSize) {
        if self.track_viewport_width {
            let change = self.viewport.update_from_width(size.width);
            self.cross_viewport(change);
        }
        self.schedule_measure(self.mode_measure());
        if self.frames.request_evaluate() {
            self.commands.push(HostCommand::RequestAnimationFrame);
        }
    }

    /// Evaluate the transition rule for a throttled scroll position.
    /// Returns the new mode when a transition happened.
    pub fn evaluate(&mut self, scroll_top: f64) -> Option<HeaderMode> {
        let probe = self.host.probe()?;
        self.evaluate_with(ScrollSample {
            scroll_top,
            header_bottom: probe.bounding_bottom,
        })
    }

    fn evaluate_with(&mut self, sample: ScrollSample) -> Option<HeaderMode> {
        let to = next_mode(self.state.mode(), sample, &self.thresholds())?;
        self.transition(to);
        Some(to)
    }

    fn transition(&mut self, to: HeaderMode) {
        let from = self.state.mode();
        let changes = self.state.enter_mode(to, self.viewport.is_mobile());
        debug!(%from, %to, forced = changes.len(), "header mode transition");
        self.schedule_measure(self.mode_measure());
        self.present();
        self.bus.publish(&HeaderEvent::Mode(ModeChange { from, to }));
        self.publish_changes(&changes, &ChangeSource::AutoScroll);
    }

    /// Measurement appropriate to the current mode.
    fn mode_measure(&self) -> MeasureRequest {
        match self.state.mode() {
            HeaderMode::Top => MeasureRequest::EXPANDED,
            HeaderMode::Scrolled => MeasureRequest::COLLAPSED,
        }
    }

    fn schedule_measure(&mut self, request: MeasureRequest) {
        if self.frames.request_measure(request) {
            self.commands.push(HostCommand::RequestAnimationFrame);
        }
    }

    fn arm_timer(&mut self, channel: TimerChannel, delay: Option<Duration>) {
        if let Some(after) = delay {
            self.commands.push(HostCommand::StartTimer { channel, after });
        }
    }

    fn present(&mut self) {
        let presentation = HeaderPresentation::derive(
            self.state.mode(),
            self.state.panels(),
            self.viewport.is_mobile(),
        );
        self.host.apply(&presentation);
    }

    fn commit(&mut self, changes: Vec<PanelChange>, source: &ChangeSource) {
        self.present();
        self.publish_changes(&changes, source);
    }

    fn publish_changes(&mut self, changes: &[PanelChange], source: &ChangeSource) {
        let mode = self.state.mode();
        for change in changes {
            let kind = if change.expanded {
                PanelEventKind::Expanded
            } else {
                PanelEventKind::Collapsed
            };
            trace!(panel = %change.panel, ?kind, %source, "panel changed");
            self.bus.publish(&HeaderEvent::Panel(PanelEvent {
                kind,
                panel: change.panel,
                mode,
                source: source.clone(),
            }));
        }
    }
}
