#![forbid(unsafe_code)]

//! Test harness for `sticky-core`.
//!
//! - [`SimulatedPage`]: a [`sticky_core::HeaderHost`] whose header height
//!   reflows with the applied presentation.
//! - [`Driver`]: an in-process event loop that routes throttle timers and
//!   animation frames on a [`DeterministicClock`].

pub mod clock;
pub mod driver;
pub mod page;

pub use clock::DeterministicClock;
pub use driver::Driver;
pub use page::SimulatedPage;
