use bytemuck::{Pod, Zeroable};

use crate::coords::{Color, Transform, Vec2};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Linked shader program.
    ProgramHandle
);
handle!(
    /// Vertex buffer (plus whatever per-draw state the backend attaches to it).
    BufferHandle
);
handle!(
    /// Display + surface + rendering context bundle for one surface epoch.
    SurfaceHandle
);

/// The drawing surface of one surface epoch.
///
/// Deliberately neither `Clone` nor `Copy`: exactly one exists per epoch and it
/// is consumed by `GraphicsBackend::release_surface`.
#[derive(Debug, PartialEq, Eq)]
pub struct SurfaceContext {
    handle: SurfaceHandle,
    width: u32,
    height: u32,
}

impl SurfaceContext {
    pub fn new(handle: SurfaceHandle, width: u32, height: u32) -> Self {
        Self { handle, width, height }
    }

    #[inline]
    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    /// Current size in physical pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Vertex record: NDC position + RGBA colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4  // color
    ];

    #[inline]
    pub fn new(position: Vec2, color: Color) -> Self {
        Self {
            position: [position.x, position.y],
            color: color.to_array(),
        }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Per-draw uniform block. Matches `Uniforms` in the WGSL programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub transform: [[f32; 4]; 3],
    pub color: [f32; 4],
}

impl Uniforms {
    pub fn new(transform: &Transform, color: Color) -> Self {
        Self {
            transform: transform.to_gpu(),
            color: color.to_array(),
        }
    }
}
