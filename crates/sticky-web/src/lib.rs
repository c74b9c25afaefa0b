#![forbid(unsafe_code)]

//! Browser shell for `sticky-core`.
//!
//! The DOM host, listeners and the exported `StickyHeaderHandle` compile only
//! on `wasm32`. Selector constants, capability selection and the
//! presentation-to-attribute mapping are plain Rust and are tested natively.

pub mod attributes;
pub mod capability;
pub mod selectors;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::StickyHeaderHandle;
