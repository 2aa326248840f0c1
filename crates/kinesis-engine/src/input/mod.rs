//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `PointerEvent`s through
//! [`platform::PointerTracker`].

pub mod platform;
mod types;

pub use types::{Handled, InputDecodeError, PointerEvent, PointerPhase};
