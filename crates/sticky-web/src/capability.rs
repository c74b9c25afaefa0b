#![forbid(unsafe_code)]

//! Browser capability selection, made once at mount.

/// How breakpoint changes are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQueryApi {
    /// `MediaQueryList.addEventListener("change", ..)`.
    Modern,
    /// `MediaQueryList.addListener(..)`.
    Legacy,
    /// No `matchMedia`: the resize handler derives the flag from width.
    WidthOnly,
}

impl MediaQueryApi {
    #[must_use]
    pub const fn select(has_match_media: bool, has_event_target: bool, has_add_listener: bool) -> Self {
        match (has_match_media, has_event_target, has_add_listener) {
            (false, _, _) => Self::WidthOnly,
            (true, true, _) => Self::Modern,
            (true, false, true) => Self::Legacy,
            (true, false, false) => Self::WidthOnly,
        }
    }

    #[must_use]
    pub const fn tracks_width(self) -> bool {
        matches!(self, Self::WidthOnly)
    }
}

/// How header size changes are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeApi {
    /// `ResizeObserver` on the header root.
    Observer,
    /// Window `resize` only; it already schedules re-measurement.
    WindowResize,
}

impl ResizeApi {
    #[must_use]
    pub const fn select(has_resize_observer: bool) -> Self {
        if has_resize_observer {
            Self::Observer
        } else {
            Self::WindowResize
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub media_query: MediaQueryApi,
    pub resize: ResizeApi,
}
