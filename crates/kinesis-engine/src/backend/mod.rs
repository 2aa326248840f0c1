//! Graphics backend capability.
//!
//! The scene, drawables and lifecycle controller only talk to the GPU through
//! [`GraphicsBackend`]. Handles are plain ids; the backend owns the real API
//! objects behind them.
//!
//! Call ordering the core guarantees:
//! - program/buffer calls only happen between `acquire_surface` and
//!   `release_surface`
//! - every created program/buffer is destroyed before `release_surface`
//! - a frame is `begin_frame`, any number of `draw`, then `present`

mod error;
mod types;
pub mod gpu;

#[cfg(test)]
pub(crate) mod recording;

pub use error::{FrameError, ResourceError, ShaderError, SurfaceError, SurfaceErrorAction};
pub use types::{BufferHandle, ProgramHandle, SurfaceContext, SurfaceHandle, Uniforms, Vertex};
pub use gpu::{WgpuBackend, WgpuConfig};

use crate::coords::Color;

/// Drawing-surface and GPU-resource capability consumed by the engine core.
pub trait GraphicsBackend {
    /// Host window type the surface is bound to.
    type Window;

    /// Binds a drawing surface (display, surface and rendering context) to `window`.
    fn acquire_surface(&mut self, window: Self::Window) -> Result<SurfaceContext, SurfaceError>;

    /// Tears down the surface. Must only be called after every resource created
    /// during the epoch has been destroyed.
    fn release_surface(&mut self, surface: SurfaceContext);

    /// Reconfigures the surface for a new pixel size.
    ///
    /// A zero dimension only updates bookkeeping; configuration is deferred until
    /// a non-zero size arrives.
    fn resize_surface(&mut self, surface: &mut SurfaceContext, width: u32, height: u32);

    /// Compiles and links a program. Diagnostics are returned verbatim.
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError>;

    fn destroy_program(&mut self, program: ProgramHandle);

    fn create_buffer(&mut self, vertices: &[Vertex]) -> Result<BufferHandle, ResourceError>;

    fn update_buffer(&mut self, buffer: BufferHandle, vertices: &[Vertex])
        -> Result<(), ResourceError>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Starts a frame and clears it to `clear`.
    fn begin_frame(&mut self, surface: &SurfaceContext, clear: Color) -> Result<(), FrameError>;

    fn draw(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        uniforms: &Uniforms,
        vertex_count: u32,
    );

    /// Submits the frame started by `begin_frame` and presents it.
    fn present(&mut self, surface: &SurfaceContext);
}
