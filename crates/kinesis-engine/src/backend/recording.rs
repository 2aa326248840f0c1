//! Test double for [`GraphicsBackend`].
//!
//! Records every call, hands out sequential handles, and panics on protocol
//! violations (resource calls without a surface, double destroy, resources alive
//! at surface release, draws outside a frame) so tests catch them directly.

use std::collections::HashSet;

use super::{
    BufferHandle, FrameError, GraphicsBackend, ProgramHandle, ResourceError, ShaderError,
    SurfaceContext, SurfaceError, SurfaceErrorAction, SurfaceHandle, Uniforms, Vertex,
};
use crate::coords::Color;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    AcquireSurface(SurfaceHandle),
    ReleaseSurface(SurfaceHandle),
    Resize(u32, u32),
    CreateProgram(ProgramHandle),
    DestroyProgram(ProgramHandle),
    CreateBuffer(BufferHandle, usize),
    UpdateBuffer(BufferHandle, usize),
    DestroyBuffer(BufferHandle),
    BeginFrame(Color),
    Draw {
        program: ProgramHandle,
        buffer: BufferHandle,
        uniforms: Uniforms,
        vertex_count: u32,
    },
    Present,
}

#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,

    /// Number of upcoming `acquire_surface` calls that fail.
    pub fail_acquire: u32,
    /// `create_program` fails when the vertex source contains any of these.
    pub failing_sources: Vec<String>,
    /// Number of upcoming `create_buffer` calls that fail.
    pub fail_buffers: u32,
    /// Error returned by every `begin_frame` while set.
    pub frame_error: Option<SurfaceErrorAction>,

    /// Size reported by the next acquired surface.
    pub surface_size: (u32, u32),

    next_id: u32,
    surface: Option<SurfaceHandle>,
    programs: HashSet<ProgramHandle>,
    buffers: HashSet<BufferHandle>,
    in_frame: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            fail_acquire: 0,
            failing_sources: Vec::new(),
            fail_buffers: 0,
            frame_error: None,
            surface_size: (1000, 1000),
            next_id: 1,
            surface: None,
            programs: HashSet::new(),
            buffers: HashSet::new(),
            in_frame: false,
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers drawn, in call order.
    pub fn drawn_buffers(&self) -> Vec<BufferHandle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<&Uniforms> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { uniforms, .. } => Some(uniforms),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn require_surface(&self, op: &str) {
        assert!(self.surface.is_some(), "{op} called without an active surface");
    }
}

impl GraphicsBackend for RecordingBackend {
    type Window = ();

    fn acquire_surface(&mut self, _window: ()) -> Result<SurfaceContext, SurfaceError> {
        assert!(self.surface.is_none(), "acquire_surface while a surface is bound");
        if self.fail_acquire > 0 {
            self.fail_acquire -= 1;
            return Err(SurfaceError::new("no EGL config matched"));
        }
        let handle = SurfaceHandle::new(self.next_id());
        self.surface = Some(handle);
        self.calls.push(Call::AcquireSurface(handle));
        let (w, h) = self.surface_size;
        Ok(SurfaceContext::new(handle, w, h))
    }

    fn release_surface(&mut self, surface: SurfaceContext) {
        assert_eq!(self.surface, Some(surface.handle()), "released a foreign surface");
        assert!(
            self.programs.is_empty() && self.buffers.is_empty(),
            "surface released with live resources: {} program(s), {} buffer(s)",
            self.programs.len(),
            self.buffers.len(),
        );
        self.surface = None;
        self.in_frame = false;
        self.calls.push(Call::ReleaseSurface(surface.handle()));
    }

    fn resize_surface(&mut self, surface: &mut SurfaceContext, width: u32, height: u32) {
        self.require_surface("resize_surface");
        surface.set_size(width, height);
        self.calls.push(Call::Resize(width, height));
    }

    fn create_program(
        &mut self,
        vertex_source: &str,
        _fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        self.require_surface("create_program");
        if self.failing_sources.iter().any(|m| vertex_source.contains(m.as_str())) {
            return Err(ShaderError::new("error: expected ';', found '}'"));
        }
        let handle = ProgramHandle::new(self.next_id());
        self.programs.insert(handle);
        self.calls.push(Call::CreateProgram(handle));
        Ok(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.require_surface("destroy_program");
        assert!(self.programs.remove(&program), "double destroy of {program:?}");
        self.calls.push(Call::DestroyProgram(program));
    }

    fn create_buffer(&mut self, vertices: &[Vertex]) -> Result<BufferHandle, ResourceError> {
        self.require_surface("create_buffer");
        if self.fail_buffers > 0 {
            self.fail_buffers -= 1;
            return Err(ResourceError::Buffer("out of device memory".to_string()));
        }
        let handle = BufferHandle::new(self.next_id());
        self.buffers.insert(handle);
        self.calls.push(Call::CreateBuffer(handle, vertices.len()));
        Ok(handle)
    }

    fn update_buffer(
        &mut self,
        buffer: BufferHandle,
        vertices: &[Vertex],
    ) -> Result<(), ResourceError> {
        self.require_surface("update_buffer");
        assert!(self.buffers.contains(&buffer), "update of dead {buffer:?}");
        self.calls.push(Call::UpdateBuffer(buffer, vertices.len()));
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.require_surface("destroy_buffer");
        assert!(self.buffers.remove(&buffer), "double destroy of {buffer:?}");
        self.calls.push(Call::DestroyBuffer(buffer));
    }

    fn begin_frame(&mut self, surface: &SurfaceContext, clear: Color) -> Result<(), FrameError> {
        assert_eq!(self.surface, Some(surface.handle()), "frame on a foreign surface");
        if let Some(action) = self.frame_error {
            return Err(FrameError::new(action, "scripted frame error"));
        }
        self.in_frame = true;
        self.calls.push(Call::BeginFrame(clear));
        Ok(())
    }

    fn draw(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        uniforms: &Uniforms,
        vertex_count: u32,
    ) {
        assert!(self.in_frame, "draw outside a frame");
        assert!(self.programs.contains(&program), "draw with dead {program:?}");
        assert!(self.buffers.contains(&buffer), "draw with dead {buffer:?}");
        self.calls.push(Call::Draw {
            program,
            buffer,
            uniforms: *uniforms,
            vertex_count,
        });
    }

    fn present(&mut self, surface: &SurfaceContext) {
        assert_eq!(self.surface, Some(surface.handle()), "present on a foreign surface");
        assert!(self.in_frame, "present without begin_frame");
        self.in_frame = false;
        self.calls.push(Call::Present);
    }
}
