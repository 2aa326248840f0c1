use std::fmt;

/// Failure to bind a drawing surface to a host window.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceError {
    pub message: String,
}

impl SurfaceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface acquisition failed: {}", self.message)
    }
}

impl std::error::Error for SurfaceError {}

/// Shader compile or link failure. `log` is the backend's diagnostic text.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderError {
    pub log: String,
}

impl ShaderError {
    pub fn new(log: impl Into<String>) -> Self {
        Self { log: log.into() }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader program failed to build: {}", self.log)
    }
}

impl std::error::Error for ShaderError {}

/// Failure to create or update a drawable's GPU resources.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The drawable's program failed to compile or link.
    Shader(ShaderError),
    /// The program failed to build earlier and is not rebuilt.
    ProgramUnusable(String),
    /// The backend could not allocate the vertex buffer.
    Buffer(String),
    /// `upload` was given a different number of vertices than the drawable owns.
    VertexCount { expected: usize, got: usize },
    /// Resource calls made without an active surface.
    NoSurface,
    /// The drawable was released; it never acquires resources again.
    Released,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(e) => write!(f, "{e}"),
            ResourceError::ProgramUnusable(key) => {
                write!(f, "program '{key}' failed earlier and is unusable")
            }
            ResourceError::Buffer(msg) => write!(f, "vertex buffer creation failed: {msg}"),
            ResourceError::VertexCount { expected, got } => {
                write!(f, "vertex count mismatch: expected {expected}, got {got}")
            }
            ResourceError::NoSurface => write!(f, "no active drawing surface"),
            ResourceError::Released => write!(f, "drawable already released"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(e: ShaderError) -> Self {
        ResourceError::Shader(e)
    }
}

/// High-level response after a frame could not be started.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Surface is unusable (commonly OOM); the epoch must be torn down.
    Fatal,
}

/// Failure to start a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    pub action: SurfaceErrorAction,
    pub message: String,
}

impl FrameError {
    pub fn new(action: SurfaceErrorAction, msg: impl Into<String>) -> Self {
        Self { action, message: msg.into() }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame not started ({:?}): {}", self.action, self.message)
    }
}

impl std::error::Error for FrameError {}
