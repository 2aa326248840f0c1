//! Surface lifecycle: `Idle <-> SurfaceReady`.
//!
//! GPU resources exist only while a surface is bound. Acquiring a surface
//! builds and initializes the scene in the same transition; losing it releases
//! every resource before the surface itself is released.

mod controller;
mod error;

pub use controller::{LifecycleState, SurfaceLifecycle};
pub use error::LifecycleError;
