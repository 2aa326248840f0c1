use std::borrow::Cow;
use std::collections::HashMap;

use crate::backend::{GraphicsBackend, ProgramHandle, ResourceError};
use crate::coords::Color;

const FLAT_VS: &str = include_str!("shaders/flat_vs.wgsl");
const FLAT_FS: &str = include_str!("shaders/flat_fs.wgsl");

/// Vertex + fragment source pair, identified by `key`.
///
/// Programs are shared by key: two sources with the same key are assumed to be
/// the same program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSource {
    key: Cow<'static, str>,
    vertex: Cow<'static, str>,
    fragment: Cow<'static, str>,
}

impl ProgramSource {
    /// Built-in flat-colour program: per-vertex colour tinted by the material colour.
    pub fn flat() -> Self {
        Self {
            key: Cow::Borrowed("flat"),
            vertex: Cow::Borrowed(FLAT_VS),
            fragment: Cow::Borrowed(FLAT_FS),
        }
    }

    /// Custom WGSL. Entry points must be `vs_main` and `fs_main`, and the vertex
    /// stage must declare the uniform block at `@group(0) @binding(0)`.
    pub fn custom(
        key: impl Into<Cow<'static, str>>,
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            key: key.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

/// Surface appearance of a drawable.
///
/// `shared` programs live in the scene's [`ProgramCache`]; otherwise the
/// drawable owns (and destroys) its program.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub program: ProgramSource,
    pub shared: bool,
}

impl Material {
    /// Flat program shared with every other flat drawable.
    pub fn flat(color: Color) -> Self {
        Self {
            color,
            program: ProgramSource::flat(),
            shared: true,
        }
    }

    /// Drawable-owned program.
    pub fn with_program(color: Color, program: ProgramSource) -> Self {
        Self {
            color,
            program,
            shared: false,
        }
    }

    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::flat(Color::WHITE)
    }
}

#[derive(Debug, Copy, Clone)]
enum CacheEntry {
    Ready(ProgramHandle),
    /// Build failed; never retried within this cache's lifetime.
    Failed,
}

/// Programs shared between drawables of one surface epoch.
#[derive(Debug, Default)]
pub struct ProgramCache {
    entries: HashMap<String, CacheEntry>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the program for `source`, building it on first use.
    pub fn get_or_create<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        source: &ProgramSource,
    ) -> Result<ProgramHandle, ResourceError> {
        match self.entries.get(source.key()) {
            Some(CacheEntry::Ready(handle)) => return Ok(*handle),
            Some(CacheEntry::Failed) => {
                return Err(ResourceError::ProgramUnusable(source.key().to_string()));
            }
            None => {}
        }

        match backend.create_program(source.vertex(), source.fragment()) {
            Ok(handle) => {
                log::debug!("program '{}' built ({handle:?})", source.key());
                self.entries
                    .insert(source.key().to_string(), CacheEntry::Ready(handle));
                Ok(handle)
            }
            Err(e) => {
                log::error!("program '{}': {e}", source.key());
                self.entries
                    .insert(source.key().to_string(), CacheEntry::Failed);
                Err(e.into())
            }
        }
    }

    /// Number of live programs.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroys every live program and forgets failures.
    pub fn release_all<B: GraphicsBackend>(&mut self, backend: &mut B) {
        for (key, entry) in self.entries.drain() {
            if let CacheEntry::Ready(handle) = entry {
                log::debug!("program '{key}' destroyed");
                backend.destroy_program(handle);
            }
        }
    }
}
