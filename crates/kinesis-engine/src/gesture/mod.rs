//! Gesture recognition: pointer events in, camera transform out.
//!
//! One pointer pans, two pointers pinch (zoom) and twist (rotate). Updates
//! derived from input are throttled independently of the frame rate; the
//! applied zoom is eased toward its target once per rendered frame.

mod config;
mod interpreter;
mod state;

pub use config::{GestureConfig, ThrottlePolicy};
pub use interpreter::{GestureDelta, GestureInterpreter};
pub use state::GestureState;
