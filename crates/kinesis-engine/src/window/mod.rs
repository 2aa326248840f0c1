//! Window + host loop.
//!
//! Owns the `winit` event loop and window and forwards lifecycle, input and
//! redraw events to [`crate::core::Engine`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
