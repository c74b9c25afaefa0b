//! The controller reports transitions and breakpoint crossings through
//! `tracing`.

use std::sync::{Arc, Mutex};

use sticky_core::HeaderMode;
use sticky_harness::{Driver, SimulatedPage};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Default)]
struct Captured {
    messages: Vec<(tracing::Level, String)>,
}

struct Capture {
    state: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            self.state
                .lock()
                .expect("capture lock")
                .messages
                .push((*event.metadata().level(), message));
        }
    }
}

fn captured<F: FnOnce()>(f: F) -> Vec<(tracing::Level, String)> {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(Capture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    f();
    let messages = state.lock().expect("capture lock").messages.clone();
    messages
}

#[test]
fn mode_transition_is_logged_at_debug() {
    let messages = captured(|| {
        let mut driver = Driver::desktop(SimulatedPage::default());
        driver.scroll_to(1000.0, 10);
        assert_eq!(driver.mode(), HeaderMode::Scrolled);
    });
    assert!(
        messages
            .iter()
            .any(|(level, m)| *level == tracing::Level::DEBUG && m == "header mode transition"),
        "expected transition log, got: {messages:?}"
    );
}

#[test]
fn breakpoint_crossing_is_logged() {
    let messages = captured(|| {
        let mut driver = Driver::desktop(SimulatedPage::default());
        driver.media_query(true);
    });
    assert!(
        messages
            .iter()
            .any(|(_, m)| m == "viewport breakpoint crossed"),
        "expected breakpoint log, got: {messages:?}"
    );
}

#[test]
fn rejected_height_reading_is_traced() {
    let messages = captured(|| {
        let mut driver = Driver::desktop(SimulatedPage::default());
        driver.page_mut().height_override = Some(f64::NAN);
        driver.header_resized();
        driver.settle();
    });
    assert!(
        messages
            .iter()
            .any(|(level, m)| *level == tracing::Level::TRACE
                && m == "rejected expanded height reading"),
        "expected rejection trace, got: {messages:?}"
    );
}
