#![forbid(unsafe_code)]

//! Tunables for the header controller.
//!
//! Every field defaults to the value the controller uses without any
//! configuration, so `StickyConfig::default()` is the reference behavior.
//! Hosts may supply overrides as JSON (the wasm entry point accepts a JSON
//! string) or, with the `toml-config` feature, as TOML:
//!
//! ```toml
//! scroll_throttle_ms = 60
//! mobile_breakpoint_px = 800
//!
//! [buffer]
//! min_px = 32.0
//! ```

use core::time::Duration;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metrics::{BufferPolicy, DEFAULT_BUFFER_RATIO, DEFAULT_MAX_BUFFER, DEFAULT_MIN_BUFFER};
use crate::mode::DEFAULT_COLLAPSE_TOLERANCE;
use crate::viewport::{Breakpoint, DEFAULT_MOBILE_BREAKPOINT};

/// Default scroll throttle interval.
pub const DEFAULT_SCROLL_THROTTLE_MS: u64 = 75;
/// Default resize throttle interval.
pub const DEFAULT_RESIZE_THROTTLE_MS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyConfig {
    pub scroll_throttle_ms: u64,
    pub resize_throttle_ms: u64,
    pub mobile_breakpoint_px: u32,
    /// Pixel tolerance for "header bottom reached the viewport top".
    pub collapse_tolerance_px: f64,
    pub buffer: BufferConfig,
}

/// Re-expand buffer bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub min_px: f64,
    pub max_px: f64,
    pub expanded_ratio: f64,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: DEFAULT_SCROLL_THROTTLE_MS,
            resize_throttle_ms: DEFAULT_RESIZE_THROTTLE_MS,
            mobile_breakpoint_px: DEFAULT_MOBILE_BREAKPOINT,
            collapse_tolerance_px: DEFAULT_COLLAPSE_TOLERANCE,
            buffer: BufferConfig::default(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            min_px: DEFAULT_MIN_BUFFER,
            max_px: DEFAULT_MAX_BUFFER,
            expanded_ratio: DEFAULT_BUFFER_RATIO,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "toml-config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl StickyConfig {
    /// Parse JSON and validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse TOML and validate.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// List every out-of-range parameter. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.scroll_throttle_ms == 0 {
            errors.push("scroll_throttle_ms must be > 0".into());
        }
        if self.resize_throttle_ms == 0 {
            errors.push("resize_throttle_ms must be > 0".into());
        }
        if self.mobile_breakpoint_px == 0 {
            errors.push("mobile_breakpoint_px must be > 0".into());
        }
        if !self.collapse_tolerance_px.is_finite() || self.collapse_tolerance_px < 0.0 {
            errors.push(format!(
                "collapse_tolerance_px must be >= 0, got {}",
                self.collapse_tolerance_px
            ));
        }
        if !self.buffer.min_px.is_finite() || self.buffer.min_px < 0.0 {
            errors.push(format!(
                "buffer.min_px must be >= 0, got {}",
                self.buffer.min_px
            ));
        }
        if !self.buffer.max_px.is_finite() || self.buffer.max_px < self.buffer.min_px {
            errors.push(format!(
                "buffer.max_px must be >= buffer.min_px, got {} < {}",
                self.buffer.max_px, self.buffer.min_px
            ));
        }
        if !(0.0..=1.0).contains(&self.buffer.expanded_ratio) {
            errors.push(format!(
                "buffer.expanded_ratio must be in [0, 1], got {}",
                self.buffer.expanded_ratio
            ));
        }

        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            warn!(count = errors.len(), "rejected sticky header config");
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub const fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    #[must_use]
    pub const fn resize_interval(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }

    #[must_use]
    pub const fn breakpoint(&self) -> Breakpoint {
        Breakpoint::new(self.mobile_breakpoint_px)
    }

    #[must_use]
    pub const fn buffer_policy(&self) -> BufferPolicy {
        BufferPolicy {
            min: self.buffer.min_px,
            max: self.buffer.max_px,
            ratio: self.buffer.expanded_ratio,
        }
    }
}
