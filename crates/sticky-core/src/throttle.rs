#![forbid(unsafe_code)]

//! Leading/trailing throttle over a host-supplied monotonic clock.
//!
//! Scroll and resize fire far more often than the header needs to react.
//! [`Throttle`] runs the first call of a burst immediately, keeps only the
//! latest arguments of the calls that follow, and hands the host a single
//! timer deadline for the trailing run. The throttle never reads a clock;
//! every call carries `now`, which keeps it deterministic under test.
//!
//! # Usage
//!
//! ```
//! use core::time::Duration;
//! use sticky_core::throttle::{Throttle, ThrottleDecision};
//!
//! let mut throttle = Throttle::new(Duration::from_millis(75));
//! assert_eq!(throttle.call(Duration::ZERO, 1), ThrottleDecision::Run(1));
//! assert!(matches!(
//!     throttle.call(Duration::from_millis(10), 2),
//!     ThrottleDecision::Deferred { arm_timer: Some(_) }
//! ));
//! throttle.call(Duration::from_millis(20), 3);
//! assert_eq!(throttle.fire(Duration::from_millis(75)), Some(3));
//! ```

use core::time::Duration;

use tracing::trace;

/// Outcome of [`Throttle::call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleDecision<A> {
    /// Run now with these arguments.
    Run(A),
    /// Arguments stored for the trailing run. `arm_timer` carries the delay
    /// when the host must start a timer; `None` when one is already pending.
    Deferred { arm_timer: Option<Duration> },
}

#[derive(Debug, Clone)]
pub struct Throttle<A> {
    interval: Duration,
    last_run: Option<Duration>,
    pending: Option<A>,
    timer_armed: bool,
}

impl<A> Throttle<A> {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: None,
            timer_armed: false,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a trailing run is waiting on the host timer.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Submit one call.
    pub fn call(&mut self, now: Duration, args: A) -> ThrottleDecision<A> {
        let elapsed = self.last_run.map(|last| now.saturating_sub(last));
        let window_open = elapsed.is_none_or(|e| e >= self.interval);

        if window_open && !self.timer_armed {
            self.last_run = Some(now);
            self.pending = None;
            return ThrottleDecision::Run(args);
        }

        self.pending = Some(args);
        if self.timer_armed {
            return ThrottleDecision::Deferred { arm_timer: None };
        }
        self.timer_armed = true;
        let delay = self
            .interval
            .saturating_sub(elapsed.unwrap_or(Duration::ZERO));
        trace!(delay_ms = delay.as_millis() as u64, "throttle deferred");
        ThrottleDecision::Deferred {
            arm_timer: Some(delay),
        }
    }

    /// Host timer expired. Returns the latest pending arguments, if any.
    pub fn fire(&mut self, now: Duration) -> Option<A> {
        self.timer_armed = false;
        let args = self.pending.take()?;
        self.last_run = Some(now);
        Some(args)
    }
}
