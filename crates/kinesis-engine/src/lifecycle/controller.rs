use crate::backend::{GraphicsBackend, SurfaceContext, SurfaceErrorAction};
use crate::coords::{Color, Transform};
use crate::scene::{FrameStats, Scene, SceneSpec};

use super::LifecycleError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Idle,
    SurfaceReady,
}

/// Everything that lives for exactly one surface epoch.
#[derive(Debug)]
struct Epoch {
    surface: SurfaceContext,
    scene: Scene,
}

/// Owns the backend and, while a window exists, the surface and scene.
#[derive(Debug)]
pub struct SurfaceLifecycle<B: GraphicsBackend> {
    backend: B,
    spec: SceneSpec,
    clear_color: Color,
    epoch: Option<Epoch>,
    epochs_started: u64,
}

impl<B: GraphicsBackend> SurfaceLifecycle<B> {
    pub fn new(backend: B, spec: SceneSpec, clear_color: Color) -> Self {
        Self {
            backend,
            spec,
            clear_color,
            epoch: None,
            epochs_started: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.epoch.is_some() {
            LifecycleState::SurfaceReady
        } else {
            LifecycleState::Idle
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.epoch.is_some()
    }

    /// Number of surfaces successfully acquired so far.
    #[inline]
    pub fn epochs_started(&self) -> u64 {
        self.epochs_started
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Current surface size, if ready.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.epoch.as_ref().map(|e| e.surface.size())
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.epoch.as_ref().map(|e| &e.scene)
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.epoch.as_mut().map(|e| &mut e.scene)
    }

    /// `Idle -> SurfaceReady`: acquire a surface, build the scene, init every
    /// drawable. Individual drawable failures do not fail the transition.
    pub fn on_window_available(&mut self, window: B::Window) -> Result<(), LifecycleError> {
        if self.epoch.is_some() {
            log::warn!("window available while a surface is bound; ignored");
            return Err(LifecycleError::AlreadyReady);
        }

        let surface = self.backend.acquire_surface(window).map_err(|e| {
            log::error!("{e}; waiting for the next window");
            LifecycleError::from(e)
        })?;

        let mut scene = self.spec.build();
        scene.set_clear_color(self.clear_color);
        let ready = scene.init_all(&mut self.backend);

        self.epochs_started += 1;
        let (w, h) = surface.size();
        log::info!(
            "surface ready ({w}x{h}), epoch {}, {ready}/{} drawables",
            self.epochs_started,
            scene.len()
        );
        self.epoch = Some(Epoch { surface, scene });
        Ok(())
    }

    /// `SurfaceReady -> Idle`. No-op when already idle.
    pub fn on_window_lost(&mut self) {
        let Some(mut epoch) = self.epoch.take() else {
            log::debug!("window lost while idle; nothing to release");
            return;
        };
        epoch.scene.release_all(&mut self.backend);
        self.backend.release_surface(epoch.surface);
        log::info!("surface released");
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(epoch) = self.epoch.as_mut() {
            self.backend.resize_surface(&mut epoch.surface, width, height);
        }
    }

    /// Renders one frame with `camera`. Returns `None` when idle or when the
    /// frame could not be started.
    pub fn request_frame(&mut self, camera: Transform) -> Option<FrameStats> {
        let epoch = self.epoch.as_mut()?;
        if epoch.surface.is_zero_sized() {
            return None;
        }
        epoch.scene.set_camera_transform(camera);

        match epoch.scene.render_frame(&mut self.backend, &epoch.surface) {
            Ok(stats) => Some(stats),
            Err(e) => {
                match e.action {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("{e}");
                    }
                    SurfaceErrorAction::Fatal => {
                        log::error!("{e}; tearing the surface down");
                        self.on_window_lost();
                    }
                }
                None
            }
        }
    }

    /// Integrates scene animation while ready.
    pub fn advance(&mut self, dt: f32) {
        if let Some(epoch) = self.epoch.as_mut() {
            epoch.scene.advance(dt);
        }
    }
}

impl<B: GraphicsBackend> Drop for SurfaceLifecycle<B> {
    fn drop(&mut self) {
        self.on_window_lost();
    }
}
