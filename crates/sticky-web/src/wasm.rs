#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: mounting, browser listeners and the JS API.
//!
//! The controller lives in a `RefCell` inside [`Shared`]. Every entry point
//! borrows it, runs one controller operation, drains its commands and
//! releases the borrow before any event reaches the page. Events queue in an
//! outbox and are delivered afterwards, so a listener that calls back into
//! the handle takes the same path instead of aliasing the controller.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use sticky_core::{
    ChangeSource, HeaderEvent, HostCommand, PanelKey, StickyConfig, StickyHeader, TimerChannel,
    ViewportSize,
};
use tracing::{debug, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Document, Event, EventTarget,
    HtmlElement, MediaQueryList, ResizeObserver, Window,
};
use web_time::Instant;

use crate::capability::{Capabilities, MediaQueryApi, ResizeApi};
use crate::dom::{DomHost, panel_for_event};
use crate::selectors::{COLLAPSE_ATTR, PANEL_ATTR, PILL_ATTR, header_root};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "sticky header panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("sticky header panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Serialize through JSON into a plain JS object.
fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

fn event_detail(event: &HeaderEvent) -> JsValue {
    match event {
        HeaderEvent::Panel(panel) => to_js(panel),
        HeaderEvent::Mode(change) => to_js(change),
    }
}

fn parse_key(panel: &str) -> Result<PanelKey, JsValue> {
    panel
        .parse()
        .map_err(|err: sticky_core::panel::ParsePanelKeyError| JsValue::from_str(&err.to_string()))
}

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

/// Pick listener APIs once and open the breakpoint media query if possible.
fn detect(window: &Window, media_query: &str) -> (Capabilities, Option<MediaQueryList>) {
    let list = if has_property(window, "matchMedia") {
        window.match_media(media_query).ok().flatten()
    } else {
        None
    };
    let media_query = match &list {
        Some(list) => MediaQueryApi::select(
            true,
            has_property(list, "addEventListener"),
            has_property(list, "addListener"),
        ),
        None => MediaQueryApi::select(false, false, false),
    };
    let resize = ResizeApi::select(has_property(window, "ResizeObserver"));
    (
        Capabilities {
            media_query,
            resize,
        },
        list,
    )
}

fn inner_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn inner_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

enum Outgoing {
    /// Bubbling `CustomEvent` from the header root.
    Dom(HeaderEvent),
    /// JS subscriber registered through the handle.
    Call(Function, HeaderEvent),
}

struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct MediaListener {
    list: MediaQueryList,
    api: MediaQueryApi,
    closure: Closure<dyn FnMut(JsValue)>,
}

struct Shared {
    window: Window,
    document: Document,
    root: HtmlElement,
    header: RefCell<StickyHeader<DomHost>>,
    outbox: Rc<RefCell<Vec<Outgoing>>>,
    origin: Instant,
    frame_pending: Cell<bool>,
    flushing: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
    media: RefCell<Option<MediaListener>>,
    observer: RefCell<Option<(ResizeObserver, Closure<dyn FnMut()>)>>,
}

impl Shared {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Run one controller operation, then schedule its commands and deliver
    /// its events. `None` when the controller is already borrowed (a
    /// synchronous DOM event raised from inside an operation, e.g. `focus()`).
    fn run<R>(
        self: &Rc<Self>,
        f: impl FnOnce(&mut StickyHeader<DomHost>, Duration) -> R,
    ) -> Option<R> {
        let now = self.now();
        let (result, commands) = {
            let Ok(mut header) = self.header.try_borrow_mut() else {
                trace!("re-entrant header call skipped");
                return None;
            };
            let result = f(&mut header, now);
            (result, header.drain_commands())
        };
        self.schedule(commands);
        self.flush();
        Some(result)
    }

    fn schedule(self: &Rc<Self>, commands: Vec<HostCommand>) {
        for command in commands {
            match command {
                HostCommand::RequestAnimationFrame => self.request_frame(),
                HostCommand::StartTimer { channel, after } => self.start_timer(channel, after),
            }
        }
    }

    fn request_frame(self: &Rc<Self>) {
        if self.frame_pending.replace(true) {
            return;
        }
        let weak = Rc::downgrade(self);
        let callback = Closure::once_into_js(move |_timestamp: JsValue| {
            if let Some(shared) = weak.upgrade() {
                shared.frame_pending.set(false);
                shared.run(|header, _| header.on_animation_frame());
            }
        });
        if self
            .window
            .request_animation_frame(callback.unchecked_ref())
            .is_ok()
        {
            return;
        }
        // No rAF (hidden iframes in some engines): fall back to a timeout.
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 16)
        {
            self.frame_pending.set(false);
            warn!(?err, "could not schedule animation frame");
        }
    }

    fn start_timer(self: &Rc<Self>, channel: TimerChannel, after: Duration) {
        let weak = Rc::downgrade(self);
        let callback = Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.run(|header, now| header.on_timer(now, channel));
            }
        });
        let delay = i32::try_from(after.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            warn!(?channel, ?err, "could not start throttle timer");
        }
    }

    fn flush(&self) {
        if self.flushing.replace(true) {
            return;
        }
        loop {
            let batch = core::mem::take(&mut *self.outbox.borrow_mut());
            if batch.is_empty() {
                break;
            }
            for outgoing in batch {
                match outgoing {
                    Outgoing::Dom(event) => self.dispatch_dom(&event),
                    Outgoing::Call(callback, event) => {
                        if let Err(err) = callback.call1(&JsValue::NULL, &event_detail(&event)) {
                            console_error(&format!("sticky header subscriber threw: {err:?}"));
                        }
                    }
                }
            }
        }
        self.flushing.set(false);
    }

    fn dispatch_dom(&self, event: &HeaderEvent) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&event_detail(event));
        match CustomEvent::new_with_event_init_dict(event.dom_name(), &init) {
            Ok(custom) => {
                let _ = self.root.dispatch_event(&custom);
            }
            Err(err) => warn!(name = event.dom_name(), ?err, "could not build CustomEvent"),
        }
    }

    fn scroll_top(&self) -> f64 {
        self.window
            .scroll_y()
            .or_else(|_| self.window.page_y_offset())
            .unwrap_or(0.0)
    }

    fn add_listener(
        self: &Rc<Self>,
        target: &EventTarget,
        name: &'static str,
        options: Option<&AddEventListenerOptions>,
        handler: fn(&Rc<Self>, Event),
    ) {
        let weak = Rc::downgrade(self);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, event);
            }
        });
        let attached = match options {
            Some(options) => target.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                options,
            ),
            None => target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()),
        };
        if let Err(err) = attached {
            warn!(event = name, ?err, "listener not attached");
            return;
        }
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            name,
            closure,
        });
    }

    fn listen(self: &Rc<Self>, capabilities: Capabilities, list: Option<MediaQueryList>) {
        let passive = AddEventListenerOptions::new();
        passive.set_passive(true);
        let window: EventTarget = self.window.clone().into();
        let document: EventTarget = self.document.clone().into();
        let root: EventTarget = self.root.clone().into();

        self.add_listener(&window, "scroll", Some(&passive), |shared, _| {
            let scroll_top = shared.scroll_top();
            shared.run(|header, now| header.on_scroll(now, scroll_top));
        });
        self.add_listener(&window, "resize", Some(&passive), |shared, _| {
            let size = ViewportSize {
                width: inner_width(&shared.window),
                height: inner_height(&shared.window),
            };
            shared.run(|header, now| header.on_resize(now, size));
        });
        self.add_listener(&root, "focusin", None, |shared, event| {
            if let Some(panel) = panel_for_event(&event, PANEL_ATTR) {
                shared.run(|header, _| header.on_focus_in(panel));
            }
        });
        // Pills may float outside the header, so clicks are delegated from
        // the document.
        self.add_listener(&document, "click", None, |shared, event| {
            if let Some(panel) = panel_for_event(&event, PILL_ATTR) {
                shared.run(|header, _| header.on_pill_click(panel));
            } else if let Some(panel) = panel_for_event(&event, COLLAPSE_ATTR) {
                shared.run(|header, _| header.on_collapse_click(panel));
            }
        });

        if let Some(list) = list {
            self.listen_media(capabilities.media_query, list);
        }
        if capabilities.resize == ResizeApi::Observer {
            self.observe_header();
        }
        debug!(?capabilities, "sticky header listening");
    }

    fn listen_media(self: &Rc<Self>, api: MediaQueryApi, list: MediaQueryList) {
        let weak = Rc::downgrade(self);
        let source = list.clone();
        // Legacy listeners receive the list itself rather than an event, so
        // the flag is always read back from the list.
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            if let Some(shared) = weak.upgrade() {
                let is_mobile = source.matches();
                shared.run(|header, _| header.on_viewport_change(is_mobile));
            }
        });
        let attached = match api {
            MediaQueryApi::Modern => {
                list.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            }
            MediaQueryApi::Legacy => {
                list.add_listener_with_opt_callback(Some(closure.as_ref().unchecked_ref()))
            }
            MediaQueryApi::WidthOnly => return,
        };
        match attached {
            Ok(()) => *self.media.borrow_mut() = Some(MediaListener { list, api, closure }),
            Err(err) => warn!(?api, ?err, "media query listener not attached"),
        }
    }

    fn observe_header(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.run(|header, _| header.on_header_resized());
            }
        });
        match ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.root);
                *self.observer.borrow_mut() = Some((observer, closure));
            }
            Err(err) => warn!(?err, "ResizeObserver construction failed"),
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        for listener in self.listeners.get_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        if let Some(media) = self.media.get_mut().take() {
            let callback: &Function = media.closure.as_ref().unchecked_ref();
            let _ = match media.api {
                MediaQueryApi::Modern => media
                    .list
                    .remove_event_listener_with_callback("change", callback),
                _ => media.list.remove_listener_with_opt_callback(Some(callback)),
            };
        }
        if let Some((observer, _closure)) = self.observer.get_mut().take() {
            observer.disconnect();
        }
    }
}

/// Handle to one mounted header controller.
///
/// A page without `[data-sticky-header]` yields an inert handle: every
/// mutator returns `false` and `getState()` returns `null`.
#[wasm_bindgen]
pub struct StickyHeaderHandle {
    shared: Option<Rc<Shared>>,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

impl StickyHeaderHandle {
    const fn inert() -> Self {
        Self { shared: None }
    }

    fn with<R>(&self, f: impl FnOnce(&mut StickyHeader<DomHost>, Duration) -> R) -> Option<R> {
        self.shared.as_ref().and_then(|shared| shared.run(f))
    }

    fn read<R>(&self, f: impl FnOnce(&StickyHeader<DomHost>) -> R) -> Option<R> {
        let shared = self.shared.as_ref()?;
        let header = shared.header.try_borrow().ok()?;
        Some(f(&header))
    }
}

#[wasm_bindgen]
impl StickyHeaderHandle {
    /// Locate the header and start listening. `config` is an optional JSON
    /// object overriding the default tunables.
    pub fn mount(config: Option<String>) -> Result<StickyHeaderHandle, JsValue> {
        install_panic_hook();
        let config = match config.as_deref() {
            Some(json) => StickyConfig::from_json_str(json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => StickyConfig::default(),
        };

        let Some(window) = web_sys::window() else {
            return Ok(Self::inert());
        };
        let Some(document) = window.document() else {
            return Ok(Self::inert());
        };
        let Some(root) = document
            .query_selector(&header_root())
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            debug!("no header root; sticky header inert");
            return Ok(Self::inert());
        };

        let breakpoint = config.breakpoint();
        let (capabilities, list) = detect(&window, &breakpoint.media_query());
        let is_mobile = list.as_ref().map_or_else(
            || breakpoint.is_mobile_width(inner_width(&window)),
            MediaQueryList::matches,
        );

        let host = DomHost::new(window.clone(), document.clone(), root.clone());
        let mut header = StickyHeader::new(host, config, is_mobile);
        header.track_viewport_width(capabilities.media_query.tracks_width());
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        header.subscribe_all(move |event| sink.borrow_mut().push(Outgoing::Dom(event.clone())));
        let commands = header.drain_commands();

        let shared = Rc::new(Shared {
            window,
            document,
            root,
            header: RefCell::new(header),
            outbox,
            origin: Instant::now(),
            frame_pending: Cell::new(false),
            flushing: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            media: RefCell::new(None),
            observer: RefCell::new(None),
        });
        shared.schedule(commands);
        shared.listen(capabilities, list);
        Ok(Self {
            shared: Some(shared),
        })
    }

    /// Whether a header root was found.
    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.shared.is_some()
    }

    /// Expand a panel (`"add"` or `"filters"`). Returns whether it changed.
    #[wasm_bindgen(js_name = expandPanel)]
    pub fn expand_panel(&self, panel: &str, source: Option<String>) -> Result<bool, JsValue> {
        let key = parse_key(panel)?;
        let source = source.map(ChangeSource::from).unwrap_or_default();
        Ok(self
            .with(|header, _| header.expand_panel(key, source))
            .unwrap_or(false))
    }

    /// Collapse a panel. A no-op on desktop while the header is at the top.
    #[wasm_bindgen(js_name = collapsePanel)]
    pub fn collapse_panel(&self, panel: &str, source: Option<String>) -> Result<bool, JsValue> {
        let key = parse_key(panel)?;
        let source = source.map(ChangeSource::from).unwrap_or_default();
        Ok(self
            .with(|header, _| header.collapse_panel(key, source))
            .unwrap_or(false))
    }

    /// `{mode, panels: {add: {expanded}, filters: {expanded}}}`.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        self.read(|header| to_js(&header.state()))
            .unwrap_or(JsValue::NULL)
    }

    /// Cached geometry, for diagnostics.
    pub fn metrics(&self) -> JsValue {
        self.read(|header| to_js(&header.metrics()))
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> Option<String> {
        self.read(|header| header.mode().as_str().to_owned())
    }

    /// Subscribe to expansions of `panel`, or of every panel when `null`.
    #[wasm_bindgen(js_name = onPanelExpanded)]
    pub fn on_panel_expanded(
        &self,
        panel: Option<String>,
        callback: Function,
    ) -> Result<f64, JsValue> {
        let key = panel.as_deref().map(parse_key).transpose()?;
        let Some(sink) = self.outbox() else {
            return Ok(0.0);
        };
        self.subscribe(|header| {
            header.on_panel_expanded(key, move |event| {
                sink.borrow_mut().push(Outgoing::Call(
                    callback.clone(),
                    HeaderEvent::Panel(event.clone()),
                ));
            })
        })
    }

    /// Subscribe to collapses of `panel`, or of every panel when `null`.
    #[wasm_bindgen(js_name = onPanelCollapsed)]
    pub fn on_panel_collapsed(
        &self,
        panel: Option<String>,
        callback: Function,
    ) -> Result<f64, JsValue> {
        let key = panel.as_deref().map(parse_key).transpose()?;
        let Some(sink) = self.outbox() else {
            return Ok(0.0);
        };
        self.subscribe(|header| {
            header.on_panel_collapsed(key, move |event| {
                sink.borrow_mut().push(Outgoing::Call(
                    callback.clone(),
                    HeaderEvent::Panel(event.clone()),
                ));
            })
        })
    }

    #[wasm_bindgen(js_name = onModeChanged)]
    pub fn on_mode_changed(&self, callback: Function) -> Result<f64, JsValue> {
        let Some(sink) = self.outbox() else {
            return Ok(0.0);
        };
        self.subscribe(|header| {
            header.on_mode_changed(move |change| {
                sink.borrow_mut()
                    .push(Outgoing::Call(callback.clone(), HeaderEvent::Mode(*change)));
            })
        })
    }

    /// Remove a subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: f64) -> bool {
        if !id.is_finite() || id < 1.0 {
            return false;
        }
        self.with(|header, _| header.unsubscribe(id as u64))
            .unwrap_or(false)
    }

    /// Detach every listener. The handle is inert afterwards.
    pub fn destroy(&mut self) {
        self.shared = None;
    }
}

impl StickyHeaderHandle {
    fn outbox(&self) -> Option<Rc<RefCell<Vec<Outgoing>>>> {
        self.shared.as_ref().map(|shared| Rc::clone(&shared.outbox))
    }

    fn subscribe(
        &self,
        f: impl FnOnce(&mut StickyHeader<DomHost>) -> sticky_core::SubscriptionId,
    ) -> Result<f64, JsValue> {
        self.with(|header, _| f(header))
            .map(|id| id as f64)
            .ok_or_else(|| JsValue::from_str("sticky header is busy"))
    }
}
