//! Drawables: geometry + material + the GPU handles backing them.
//!
//! Lifecycle: `Unresourced -> Resourced -> Released` (terminal). Handles exist
//! only while `Resourced`, and are destroyed exactly once by `release`.

mod drawable;
mod geometry;
mod material;

pub use drawable::{DrawError, Drawable, DrawableState};
pub use geometry::Geometry;
pub use material::{Material, ProgramCache, ProgramSource};
