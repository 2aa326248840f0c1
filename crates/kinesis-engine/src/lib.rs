//! Kinesis engine crate.
//!
//! A small real-time 2D renderer: a surface lifecycle that keeps GPU resources
//! tied to a live window, a scene of drawables, and multi-touch gestures
//! turned into a camera transform.

pub mod backend;
pub mod coords;
pub mod core;
pub mod drawable;
pub mod gesture;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod scene;
pub mod time;
pub mod window;
