//! Scene: ordered drawables plus a shared camera.
//!
//! Responsibilities:
//! - own drawables for one surface epoch, in draw order (back-to-front)
//! - compose `camera * local` for every entity before drawing
//! - isolate per-entity failures so one bad drawable never aborts a frame

mod entity;
mod scene;
mod spec;

pub use entity::EntityId;
pub use scene::{FrameStats, Scene};
pub use spec::{DrawableSpec, SceneSpec};
