//! Host-facing engine contract.
//!
//! The host loop drives the engine through four entry points (window
//! available, window lost, input event, render frame) plus resize. Within one
//! loop iteration the host delivers lifecycle events first, then input, then
//! asks for a frame.

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::Engine;
