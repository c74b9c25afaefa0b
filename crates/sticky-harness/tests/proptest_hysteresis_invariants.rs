//! Property tests for the mode rule, the throttle and whole-controller
//! invariants under arbitrary interaction sequences.

use core::time::Duration;

use proptest::prelude::*;
use sticky_core::mode::{ScrollSample, Thresholds, next_mode};
use sticky_core::panel::PanelStates;
use sticky_core::throttle::{Throttle, ThrottleDecision};
use sticky_core::{
    ChangeSource, HeaderEvent, HeaderMode, Metrics, PanelEventKind, PanelKey, StickyConfig,
};
use sticky_harness::{Driver, SimulatedPage};

fn metrics_strategy() -> impl Strategy<Value = Metrics> {
    (0.0f64..2000.0, 1.0f64..800.0, 0.0f64..1.0).prop_map(|(document_top, expanded, frac)| {
        let collapsed = expanded * frac;
        let policy = StickyConfig::default().buffer_policy();
        Metrics {
            document_top,
            expanded_height: expanded,
            collapsed_height: collapsed,
            expand_buffer: policy.buffer_for(expanded, collapsed),
        }
    })
}

fn mode_strategy() -> impl Strategy<Value = HeaderMode> {
    prop_oneof![Just(HeaderMode::Top), Just(HeaderMode::Scrolled)]
}

proptest! {
    #[test]
    fn top_never_collapses_at_or_inside_expand_threshold(
        metrics in metrics_strategy(),
        depth in 0.0f64..=1.0,
        header_bottom in -2000.0f64..2000.0,
        tolerance in 0.0f64..10.0,
    ) {
        let t = Thresholds::new(&metrics, tolerance);
        let scroll_top = t.expand_at * depth;
        let sample = ScrollSample { scroll_top, header_bottom };
        prop_assert_eq!(next_mode(HeaderMode::Top, sample, &t), None);
    }

    #[test]
    fn buffer_stays_within_policy_bounds(metrics in metrics_strategy()) {
        let policy = StickyConfig::default().buffer_policy();
        prop_assert!(metrics.expand_buffer >= policy.min);
        prop_assert!(metrics.expand_buffer <= policy.max);
    }

    #[test]
    fn a_transition_is_never_immediately_reversible(
        metrics in metrics_strategy(),
        current in mode_strategy(),
        scroll_top in -100.0f64..5000.0,
        header_bottom in -2000.0f64..2000.0,
        tolerance in 0.0f64..10.0,
    ) {
        let sample = ScrollSample { scroll_top, header_bottom };
        let t = Thresholds::new(&metrics, tolerance);
        if let Some(to) = next_mode(current, sample, &t) {
            prop_assert_ne!(to, current);
            prop_assert_eq!(next_mode(to, sample, &t), None);
        }
    }

    #[test]
    fn scrolled_returns_to_top_inside_buffer(
        metrics in metrics_strategy(),
        depth in 0.0f64..1.0,
        header_bottom in -2000.0f64..2000.0,
    ) {
        let scroll_top = (metrics.document_top + metrics.expand_buffer) * depth;
        let sample = ScrollSample { scroll_top, header_bottom };
        prop_assert_eq!(
            next_mode(HeaderMode::Scrolled, sample, &Thresholds::new(&metrics, 2.0)),
            Some(HeaderMode::Top)
        );
    }

    #[test]
    fn top_collapses_once_header_is_gone_and_past_buffer(
        metrics in metrics_strategy(),
        beyond in 0.001f64..5000.0,
        header_bottom in -2000.0f64..2.0,
    ) {
        let scroll_top = metrics.document_top + metrics.expand_buffer + beyond;
        let sample = ScrollSample { scroll_top, header_bottom };
        prop_assert_eq!(
            next_mode(HeaderMode::Top, sample, &Thresholds::new(&metrics, 2.0)),
            Some(HeaderMode::Scrolled)
        );
    }

    #[test]
    fn throttle_runs_at_most_once_per_interval(
        gaps in prop::collection::vec(0u64..200, 1..60),
    ) {
        let interval = Duration::from_millis(75);
        let mut throttle = Throttle::new(interval);
        let mut now = Duration::ZERO;
        let mut timer: Option<Duration> = None;
        let mut runs: Vec<(Duration, u64)> = Vec::new();
        let mut last_args = 0;

        for (i, gap) in gaps.iter().enumerate() {
            let target = now + Duration::from_millis(*gap);
            if let Some(due) = timer
                && due <= target
            {
                timer = None;
                if let Some(args) = throttle.fire(due) {
                    runs.push((due, args));
                }
            }
            now = target;
            last_args = i as u64;
            match throttle.call(now, last_args) {
                ThrottleDecision::Run(args) => runs.push((now, args)),
                ThrottleDecision::Deferred { arm_timer: Some(after) } => {
                    prop_assert!(timer.is_none());
                    timer = Some(now + after);
                }
                ThrottleDecision::Deferred { arm_timer: None } => {
                    prop_assert!(timer.is_some());
                }
            }
        }
        if let Some(due) = timer
            && let Some(args) = throttle.fire(due)
        {
            runs.push((due, args));
        }

        prop_assert!(!throttle.has_pending());
        prop_assert_eq!(runs.last().map(|r| r.1), Some(last_args));
        for pair in runs.windows(2) {
            prop_assert!(pair[1].0 - pair[0].0 >= interval);
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    ScrollTo(f64),
    Jump(f64),
    Pill(PanelKey),
    Focus(PanelKey),
    CollapseClick(PanelKey),
    Expand(PanelKey),
    Collapse(PanelKey),
    Media(bool),
    HeaderResized,
    Advance(u64),
}

fn key_strategy() -> impl Strategy<Value = PanelKey> {
    prop_oneof![Just(PanelKey::Add), Just(PanelKey::Filters)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0f64..3000.0).prop_map(Op::ScrollTo),
        (0.0f64..3000.0).prop_map(Op::Jump),
        key_strategy().prop_map(Op::Pill),
        key_strategy().prop_map(Op::Focus),
        key_strategy().prop_map(Op::CollapseClick),
        key_strategy().prop_map(Op::Expand),
        key_strategy().prop_map(Op::Collapse),
        any::<bool>().prop_map(Op::Media),
        Just(Op::HeaderResized),
        (0u64..400).prop_map(Op::Advance),
    ]
}

fn run(driver: &mut Driver, op: &Op) {
    match *op {
        Op::ScrollTo(y) => driver.scroll_to(y, 6),
        Op::Jump(y) => driver.jump_to(y),
        Op::Pill(key) => driver.click_pill(key),
        Op::Focus(key) => driver.focus_in(key),
        Op::CollapseClick(key) => driver.click_collapse(key),
        Op::Expand(key) => {
            driver.expand(key, ChangeSource::Api);
        }
        Op::Collapse(key) => {
            driver.collapse(key, ChangeSource::Api);
        }
        Op::Media(mobile) => driver.media_query(mobile),
        Op::HeaderResized => driver.header_resized(),
        Op::Advance(ms) => {
            driver.advance(Duration::from_millis(ms));
            driver.frame();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn controller_invariants_hold_under_any_interaction(
        start_mobile in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut driver = if start_mobile {
            Driver::mobile(SimulatedPage::default())
        } else {
            Driver::desktop(SimulatedPage::default())
        };
        let mut shadow = PanelStates::uniform(!start_mobile);
        let policy = StickyConfig::default().buffer_policy();

        for op in &ops {
            run(&mut driver, op);

            // Events replayed onto a shadow copy always reproduce the state,
            // and every event reports a real change.
            for event in driver.take_events() {
                if let HeaderEvent::Panel(panel) = event {
                    let expanded = panel.kind == PanelEventKind::Expanded;
                    prop_assert!(shadow.set_expanded(panel.panel, expanded));
                }
            }
            for key in PanelKey::ALL {
                prop_assert_eq!(shadow.is_expanded(key), driver.is_expanded(key));
            }

            let mobile = driver.header().viewport().is_mobile;
            if driver.mode() == HeaderMode::Top && !mobile {
                prop_assert!(driver.is_expanded(PanelKey::Add));
                prop_assert!(driver.is_expanded(PanelKey::Filters));
            }

            if let Some(presentation) = driver.page().presentation() {
                for key in PanelKey::ALL {
                    let p = presentation.panel(key);
                    prop_assert_eq!(p.expanded, driver.is_expanded(key));
                    prop_assert_ne!(p.panel_visible, p.pill_visible);
                    if presentation.mode == HeaderMode::Top && !presentation.is_mobile {
                        prop_assert!(!p.collapse_visible);
                    }
                }
            }

            let buffer = driver.header().metrics().expand_buffer;
            prop_assert!(buffer >= policy.min && buffer <= policy.max);
        }
    }
}
