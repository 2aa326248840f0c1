use std::fmt;

use crate::backend::{BufferHandle, GraphicsBackend, ProgramHandle, ResourceError, Uniforms, Vertex};
use crate::coords::Transform;

use super::{Geometry, Material, ProgramCache};

/// Externally visible residency state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawableState {
    /// Constructed (or failed to init); no GPU handles.
    Unresourced,
    /// Program and buffer are alive.
    Resourced,
    /// Terminal. Handles destroyed.
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ProgramBinding {
    Owned(ProgramHandle),
    /// Borrowed from the `ProgramCache`; destroyed by the cache.
    Shared(ProgramHandle),
}

impl ProgramBinding {
    fn handle(self) -> ProgramHandle {
        match self {
            ProgramBinding::Owned(h) | ProgramBinding::Shared(h) => h,
        }
    }
}

#[derive(Debug)]
enum Residency {
    Unresourced,
    Resourced {
        program: ProgramBinding,
        buffer: BufferHandle,
    },
    Released,
}

/// Rejected draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawError {
    NotResourced,
    Released,
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::NotResourced => write!(f, "drawable has no GPU resources"),
            DrawError::Released => write!(f, "drawable was released"),
        }
    }
}

impl std::error::Error for DrawError {}

/// A renderable entity: one vertex buffer, one program.
#[derive(Debug)]
pub struct Drawable {
    label: String,
    vertices: Vec<Vertex>,
    material: Material,
    residency: Residency,
    /// Owned program failed to build; it is not rebuilt.
    program_failed: bool,
}

impl Drawable {
    pub fn new(label: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            label: label.into(),
            vertices: geometry.vertices().to_vec(),
            material,
            residency: Residency::Unresourced,
            program_failed: false,
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn state(&self) -> DrawableState {
        match self.residency {
            Residency::Unresourced => DrawableState::Unresourced,
            Residency::Resourced { .. } => DrawableState::Resourced,
            Residency::Released => DrawableState::Released,
        }
    }

    /// `Unresourced -> Resourced`. A no-op when already resourced.
    ///
    /// On failure every handle created here is destroyed again and the drawable
    /// stays `Unresourced`.
    pub fn init<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        programs: &mut ProgramCache,
    ) -> Result<(), ResourceError> {
        match self.residency {
            Residency::Unresourced => {}
            Residency::Resourced { .. } => return Ok(()),
            Residency::Released => return Err(ResourceError::Released),
        }

        let program = if self.material.shared {
            ProgramBinding::Shared(programs.get_or_create(backend, &self.material.program)?)
        } else {
            ProgramBinding::Owned(self.build_owned_program(backend)?)
        };

        let buffer = match backend.create_buffer(&self.vertices) {
            Ok(buffer) => buffer,
            Err(e) => {
                if let ProgramBinding::Owned(handle) = program {
                    backend.destroy_program(handle);
                }
                return Err(e);
            }
        };

        log::debug!("drawable '{}' resourced ({program:?}, {buffer:?})", self.label);
        self.residency = Residency::Resourced { program, buffer };
        Ok(())
    }

    fn build_owned_program<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
    ) -> Result<ProgramHandle, ResourceError> {
        let source = &self.material.program;
        if self.program_failed {
            return Err(ResourceError::ProgramUnusable(source.key().to_string()));
        }
        backend
            .create_program(source.vertex(), source.fragment())
            .map_err(|e| {
                log::error!("drawable '{}': {e}", self.label);
                self.program_failed = true;
                ResourceError::from(e)
            })
    }

    /// Replaces the vertex data. The vertex count is fixed at construction.
    pub fn upload<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        vertices: &[Vertex],
    ) -> Result<(), ResourceError> {
        if vertices.len() != self.vertices.len() {
            return Err(ResourceError::VertexCount {
                expected: self.vertices.len(),
                got: vertices.len(),
            });
        }
        match self.residency {
            Residency::Resourced { buffer, .. } => backend.update_buffer(buffer, vertices)?,
            Residency::Unresourced => {}
            Residency::Released => return Err(ResourceError::Released),
        }
        self.vertices.copy_from_slice(vertices);
        Ok(())
    }

    /// Issues one draw with `transform` fully composed by the caller.
    pub fn draw<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        transform: &Transform,
    ) -> Result<(), DrawError> {
        match self.residency {
            Residency::Resourced { program, buffer } => {
                let uniforms = Uniforms::new(transform, self.material.color);
                backend.draw(program.handle(), buffer, &uniforms, self.vertices.len() as u32);
                Ok(())
            }
            Residency::Unresourced => Err(DrawError::NotResourced),
            Residency::Released => {
                debug_assert!(false, "draw on released drawable '{}'", self.label);
                log::error!("draw on released drawable '{}' ignored", self.label);
                Err(DrawError::Released)
            }
        }
    }

    /// `* -> Released`. Destroys the buffer and an owned program exactly once;
    /// later calls do nothing.
    pub fn release<B: GraphicsBackend>(&mut self, backend: &mut B) {
        match std::mem::replace(&mut self.residency, Residency::Released) {
            Residency::Resourced { program, buffer } => {
                backend.destroy_buffer(buffer);
                if let ProgramBinding::Owned(handle) = program {
                    backend.destroy_program(handle);
                }
                log::debug!("drawable '{}' released", self.label);
            }
            Residency::Unresourced => {
                log::debug!("drawable '{}' released without resources", self.label);
            }
            Residency::Released => {}
        }
    }
}
