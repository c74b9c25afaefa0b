#![forbid(unsafe_code)]

//! Panel identity, per-panel state and change attribution.
//!
//! The header hosts exactly two panels. Each one is either expanded (inline
//! content visible) or collapsed (represented by its pill). Every change is
//! attributed to a [`ChangeSource`] so collaborators can tell a user gesture
//! apart from a scroll-driven or viewport-driven one.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two independently controlled header panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKey {
    /// Task-creation panel.
    Add,
    /// Filter panel.
    Filters,
}

impl PanelKey {
    /// Both panels, in presentation order.
    pub const ALL: [Self; 2] = [Self::Add, Self::Filters];

    /// Stable string form used in DOM attributes and event payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Filters => "filters",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Add => 0,
            Self::Filters => 1,
        }
    }
}

impl fmt::Display for PanelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel key: {0:?} (expected \"add\" or \"filters\")")]
pub struct ParsePanelKeyError(pub String);

impl FromStr for PanelKey {
    type Err = ParsePanelKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(Self::Add),
            "filters" => Ok(Self::Filters),
            other => Err(ParsePanelKeyError(other.to_owned())),
        }
    }
}

/// Expand/collapse state of a single panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    pub expanded: bool,
}

/// State of both panels, indexed by [`PanelKey`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelStates {
    states: [PanelState; 2],
}

impl PanelStates {
    /// Both panels set to the same expansion.
    #[must_use]
    pub const fn uniform(expanded: bool) -> Self {
        Self {
            states: [PanelState { expanded }; 2],
        }
    }

    #[must_use]
    pub const fn get(&self, key: PanelKey) -> PanelState {
        self.states[key.index()]
    }

    #[must_use]
    pub const fn is_expanded(&self, key: PanelKey) -> bool {
        self.states[key.index()].expanded
    }

    /// Set a panel's flag. Returns `true` when the value changed.
    pub fn set_expanded(&mut self, key: PanelKey, expanded: bool) -> bool {
        let slot = &mut self.states[key.index()];
        let changed = slot.expanded != expanded;
        slot.expanded = expanded;
        changed
    }

    /// Whether every panel is expanded.
    #[must_use]
    pub fn all_expanded(&self) -> bool {
        self.states.iter().all(|s| s.expanded)
    }

    /// Whether no panel is expanded.
    #[must_use]
    pub fn none_expanded(&self) -> bool {
        self.states.iter().all(|s| !s.expanded)
    }

    /// Panels whose flag differs from `expanded`, in presentation order.
    pub fn keys_not(&self, expanded: bool) -> impl Iterator<Item = PanelKey> + '_ {
        PanelKey::ALL
            .into_iter()
            .filter(move |key| self.is_expanded(*key) != expanded)
    }
}

/// Why a panel changed state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeSource {
    /// Forced by a mode transition.
    AutoScroll,
    /// Focus entered a control inside the panel.
    Focus,
    /// The panel's pill was activated.
    Pill,
    /// The mobile/desktop breakpoint was crossed.
    ViewportChange,
    /// The panel's collapse control was activated.
    CollapseButton,
    /// Programmatic call without an explicit source.
    #[default]
    Api,
    /// Caller-supplied label.
    Custom(String),
}

impl ChangeSource {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AutoScroll => "auto-scroll",
            Self::Focus => "focus",
            Self::Pill => "pill",
            Self::ViewportChange => "viewport-change",
            Self::CollapseButton => "collapse-button",
            Self::Api => "api",
            Self::Custom(label) => label,
        }
    }
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ChangeSource {
    fn from(label: &str) -> Self {
        match label {
            "auto-scroll" => Self::AutoScroll,
            "focus" => Self::Focus,
            "pill" => Self::Pill,
            "viewport-change" => Self::ViewportChange,
            "collapse-button" => Self::CollapseButton,
            "api" | "" => Self::Api,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for ChangeSource {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<ChangeSource> for String {
    fn from(source: ChangeSource) -> Self {
        match source {
            ChangeSource::Custom(label) => label,
            other => other.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_key_parses_known_names() {
        assert_eq!("add".parse::<PanelKey>(), Ok(PanelKey::Add));
        assert_eq!(" filters ".parse::<PanelKey>(), Ok(PanelKey::Filters));
        assert_eq!(
            "search".parse::<PanelKey>(),
            Err(ParsePanelKeyError("search".into()))
        );
    }

    #[test]
    fn panel_states_track_each_key_independently() {
        let mut states = PanelStates::uniform(false);
        assert!(states.none_expanded());
        assert!(states.set_expanded(PanelKey::Filters, true));
        assert!(!states.set_expanded(PanelKey::Filters, true));
        assert!(states.is_expanded(PanelKey::Filters));
        assert!(!states.is_expanded(PanelKey::Add));
        assert!(!states.all_expanded());
        assert!(!states.none_expanded());
        assert_eq!(states.keys_not(true).collect::<Vec<_>>(), vec![PanelKey::Add]);
    }

    #[test]
    fn change_source_labels_round_trip() {
        for source in [
            ChangeSource::AutoScroll,
            ChangeSource::Focus,
            ChangeSource::Pill,
            ChangeSource::ViewportChange,
            ChangeSource::CollapseButton,
            ChangeSource::Api,
            ChangeSource::Custom("edit-task".into()),
        ] {
            assert_eq!(ChangeSource::from(source.as_str()), source);
        }
        assert_eq!(ChangeSource::from(""), ChangeSource::Api);
    }

    #[test]
    fn change_source_serializes_as_plain_label() {
        let json = serde_json::to_string(&ChangeSource::ViewportChange).unwrap();
        assert_eq!(json, "\"viewport-change\"");
    }
}
