//! Coordinate, colour and transform types shared by the scene, the gesture
//! interpreter and the graphics backend.
//!
//! Canonical spaces:
//! - pointer input arrives in surface pixels (origin top-left, +Y down)
//! - geometry and transforms live in normalized device coordinates
//!   (origin centre, +X right, +Y up, visible range `[-1, 1]`)

mod color;
mod transform;
mod vec2;

pub use color::Color;
pub use transform::Transform;
pub use vec2::Vec2;
