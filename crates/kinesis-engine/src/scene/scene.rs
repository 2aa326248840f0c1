use crate::backend::{FrameError, GraphicsBackend, SurfaceContext};
use crate::coords::{Color, Transform};
use crate::drawable::{DrawError, Drawable, DrawableState, ProgramCache};

use super::entity::Entity;
use super::EntityId;

/// Outcome of one rendered frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// Drawables of one surface epoch plus the camera.
#[derive(Debug, Default)]
pub struct Scene {
    entities: Vec<Entity>,
    camera: Transform,
    clear_color: Color,
    programs: ProgramCache,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `drawable` at the back of the draw order. Ownership moves into
    /// the scene; it is released by [`Scene::release_all`].
    pub fn add_drawable(&mut self, drawable: Drawable) -> EntityId {
        self.entities.push(Entity::new(drawable));
        EntityId(self.entities.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn drawable(&self, id: EntityId) -> Option<&Drawable> {
        self.entities.get(id.0).map(|e| &e.drawable)
    }

    pub fn drawable_mut(&mut self, id: EntityId) -> Option<&mut Drawable> {
        self.entities.get_mut(id.0).map(|e| &mut e.drawable)
    }

    #[inline]
    pub fn camera_transform(&self) -> Transform {
        self.camera
    }

    pub fn set_camera_transform(&mut self, camera: Transform) {
        self.camera = camera;
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn set_local_transform(&mut self, id: EntityId, local: Transform) {
        match self.entities.get_mut(id.0) {
            Some(e) => e.local = local,
            None => log::warn!("set_local_transform: unknown {id:?}"),
        }
    }

    /// Continuous rotation about the entity origin, in radians per second.
    pub fn set_spin(&mut self, id: EntityId, rad_per_sec: f32) {
        match self.entities.get_mut(id.0) {
            Some(e) => e.spin = rad_per_sec,
            None => log::warn!("set_spin: unknown {id:?}"),
        }
    }

    /// Integrates spin over `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for e in &mut self.entities {
            e.advance(dt);
        }
    }

    /// Transform the entity is drawn with this frame (`camera * local`).
    pub fn final_transform(&self, id: EntityId) -> Option<Transform> {
        self.entities.get(id.0).map(|e| self.camera * e.model())
    }

    /// Initializes every unresourced drawable. Failures are logged and leave
    /// the drawable unresourced; returns how many are resourced afterwards.
    pub fn init_all<B: GraphicsBackend>(&mut self, backend: &mut B) -> usize {
        let mut ready = 0;
        for e in &mut self.entities {
            if e.drawable.state() == DrawableState::Unresourced {
                if let Err(err) = e.drawable.init(backend, &mut self.programs) {
                    log::error!("drawable '{}' failed to initialize: {err}", e.drawable.label());
                    continue;
                }
                e.skip_logged = false;
            }
            if e.drawable.state() == DrawableState::Resourced {
                ready += 1;
            }
        }
        log::debug!("scene: {ready}/{} drawables resourced", self.entities.len());
        ready
    }

    /// Clears, draws every entity in order, presents.
    ///
    /// An entity that cannot draw is skipped (logged once until it draws
    /// again); the rest of the frame proceeds.
    pub fn render_frame<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        surface: &SurfaceContext,
    ) -> Result<FrameStats, FrameError> {
        backend.begin_frame(surface, self.clear_color)?;

        let mut stats = FrameStats::default();
        for e in &mut self.entities {
            let transform = self.camera * e.model();
            match e.drawable.draw(backend, &transform) {
                Ok(()) => {
                    stats.drawn += 1;
                    e.skip_logged = false;
                }
                Err(err) => {
                    stats.skipped += 1;
                    if !e.skip_logged {
                        e.skip_logged = true;
                        match err {
                            DrawError::NotResourced => log::warn!(
                                "skipping drawable '{}': {err}",
                                e.drawable.label()
                            ),
                            DrawError::Released => log::error!(
                                "skipping drawable '{}': {err}",
                                e.drawable.label()
                            ),
                        }
                    }
                }
            }
        }

        backend.present(surface);
        Ok(stats)
    }

    /// Releases every drawable, then the shared programs. Idempotent.
    pub fn release_all<B: GraphicsBackend>(&mut self, backend: &mut B) {
        for e in &mut self.entities {
            e.drawable.release(backend);
        }
        self.programs.release_all(backend);
    }
}
