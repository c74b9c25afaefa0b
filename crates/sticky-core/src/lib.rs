#![forbid(unsafe_code)]

//! Core: the adaptive scroll header state machine.
//!
//! # Role
//! `sticky-core` decides how a page header's two panels (task creation and
//! filters) are presented while the page scrolls. Near the top of the page
//! they render inline ("expanded"); once the header has scrolled away they
//! shrink into floating pills that the user can reopen one at a time.
//!
//! # Primary responsibilities
//! - **Metrics**: cached header geometry and the re-expand hysteresis buffer.
//! - **Mode**: the `Top` / `Scrolled` transition rule.
//! - **Panels**: per-panel state, the desktop `Top` pin, presentation.
//! - **Viewport**: the mobile/desktop breakpoint.
//! - **Scheduling**: leading/trailing throttles and next-frame coalescing.
//! - **Events**: publish/subscribe lifecycle notifications.
//!
//! # How it fits
//! The crate is host-driven and deterministic: it owns no clock, no timers
//! and no DOM. A host (the `sticky-web` wasm shell, or a test harness)
//! implements [`host::HeaderHost`], forwards native events with timestamps,
//! and schedules the [`host::HostCommand`]s the controller hands back.

pub mod config;
pub mod controller;
pub mod events;
pub mod frame;
pub mod host;
pub mod metrics;
pub mod mode;
pub mod panel;
pub mod presentation;
pub mod state;
pub mod throttle;
pub mod viewport;

pub use config::{ConfigError, StickyConfig};
pub use controller::{StickyHeader, ViewportSize};
pub use events::{HeaderEvent, ModeChange, PanelEvent, PanelEventKind, SubscriptionId};
pub use host::{HeaderHost, HostCommand, TimerChannel};
pub use metrics::{HeaderProbe, Metrics};
pub use mode::HeaderMode;
pub use panel::{ChangeSource, PanelKey, PanelState};
pub use presentation::{HeaderPresentation, PanelPresentation};
pub use state::HeaderSnapshot;
