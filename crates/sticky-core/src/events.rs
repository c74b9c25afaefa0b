#![forbid(unsafe_code)]

//! Lifecycle events and the publish/subscribe bus.
//!
//! Collaborators (filter persistence, tag defaults) react to presentation
//! changes through [`EventBus`] subscriptions instead of reaching into the
//! controller. Bubbling DOM `CustomEvent`s are produced by the web host from
//! an [`EventBus::subscribe_all`] subscription, so native tests observe the
//! exact same stream.

use core::fmt;

use serde::Serialize;

use crate::mode::HeaderMode;
use crate::panel::{ChangeSource, PanelKey};

/// DOM event name for panel expansion.
pub const PANEL_EXPANDED_EVENT: &str = "sticky:panel-expanded";
/// DOM event name for panel collapse.
pub const PANEL_COLLAPSED_EVENT: &str = "sticky:panel-collapsed";
/// DOM event name for mode transitions.
pub const MODE_CHANGED_EVENT: &str = "sticky:mode-changed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelEventKind {
    Expanded,
    Collapsed,
}

/// Payload of `sticky:panel-expanded` / `sticky:panel-collapsed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelEvent {
    #[serde(skip)]
    pub kind: PanelEventKind,
    pub panel: PanelKey,
    /// Mode at the time the change was applied.
    pub mode: HeaderMode,
    pub source: ChangeSource,
}

impl PanelEvent {
    #[must_use]
    pub const fn dom_name(&self) -> &'static str {
        match self.kind {
            PanelEventKind::Expanded => PANEL_EXPANDED_EVENT,
            PanelEventKind::Collapsed => PANEL_COLLAPSED_EVENT,
        }
    }
}

/// Payload of `sticky:mode-changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeChange {
    pub from: HeaderMode,
    pub to: HeaderMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEvent {
    Panel(PanelEvent),
    Mode(ModeChange),
}

impl HeaderEvent {
    #[must_use]
    pub const fn dom_name(&self) -> &'static str {
        match self {
            Self::Panel(event) => event.dom_name(),
            Self::Mode(_) => MODE_CHANGED_EVENT,
        }
    }
}

pub type SubscriptionId = u64;

type PanelCallback = Box<dyn FnMut(&PanelEvent)>;

enum Callback {
    Panel {
        kind: PanelEventKind,
        panel: Option<PanelKey>,
        f: PanelCallback,
    },
    Mode(Box<dyn FnMut(&ModeChange)>),
    All(Box<dyn FnMut(&HeaderEvent)>),
}

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

/// Single-threaded subscriber registry.
///
/// Callbacks run synchronously inside [`EventBus::publish`] in subscription
/// order. They cannot reach the controller that owns the bus; hosts that
/// need to call back in should queue the event and act after the current
/// operation returns.
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: SubscriptionId,
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to expansions of `panel`, or of any panel when `None`.
    pub fn on_panel_expanded(
        &mut self,
        panel: Option<PanelKey>,
        f: impl FnMut(&PanelEvent) + 'static,
    ) -> SubscriptionId {
        self.insert(Callback::Panel {
            kind: PanelEventKind::Expanded,
            panel,
            f: Box::new(f),
        })
    }

    /// Subscribe to collapses of `panel`, or of any panel when `None`.
    pub fn on_panel_collapsed(
        &mut self,
        panel: Option<PanelKey>,
        f: impl FnMut(&PanelEvent) + 'static,
    ) -> SubscriptionId {
        self.insert(Callback::Panel {
            kind: PanelEventKind::Collapsed,
            panel,
            f: Box::new(f),
        })
    }

    pub fn on_mode_changed(&mut self, f: impl FnMut(&ModeChange) + 'static) -> SubscriptionId {
        self.insert(Callback::Mode(Box::new(f)))
    }

    /// Receive every event.
    pub fn subscribe_all(&mut self, f: impl FnMut(&HeaderEvent) + 'static) -> SubscriptionId {
        self.insert(Callback::All(Box::new(f)))
    }

    /// Remove a subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &HeaderEvent) {
        for subscriber in &mut self.subscribers {
            match (&mut subscriber.callback, event) {
                (Callback::All(f), _) => f(event),
                (Callback::Mode(f), HeaderEvent::Mode(change)) => f(change),
                (Callback::Panel { kind, panel, f }, HeaderEvent::Panel(panel_event))
                    if *kind == panel_event.kind
                        && panel.is_none_or(|key| key == panel_event.panel) =>
                {
                    f(panel_event);
                }
                _ => {}
            }
        }
    }

    fn insert(&mut self, callback: Callback) -> SubscriptionId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.subscribers.push(Subscriber { id, callback });
        id
    }
}
