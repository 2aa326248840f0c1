use crate::backend::GraphicsBackend;
use crate::gesture::GestureInterpreter;
use crate::input::{Handled, PointerEvent};
use crate::lifecycle::{LifecycleError, LifecycleState, SurfaceLifecycle};
use crate::scene::{FrameStats, Scene};
use crate::time::FrameClock;

use super::EngineConfig;

/// Process-scoped engine: surface lifecycle, gestures and frame timing.
///
/// Gesture accumulators outlive surface epochs; pointer anchors do not.
#[derive(Debug)]
pub struct Engine<B: GraphicsBackend> {
    lifecycle: SurfaceLifecycle<B>,
    gesture: GestureInterpreter,
    clock: FrameClock,
}

impl<B: GraphicsBackend> Engine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self {
            lifecycle: SurfaceLifecycle::new(backend, config.scene, config.clear_color),
            gesture: GestureInterpreter::new(config.gesture),
            clock: FrameClock::new(),
        }
    }

    pub fn on_window_available(&mut self, window: B::Window) -> Result<(), LifecycleError> {
        self.lifecycle.on_window_available(window)?;
        if let Some((w, h)) = self.lifecycle.surface_size() {
            self.gesture.set_surface_size(w, h);
        }
        self.clock.reset();
        Ok(())
    }

    pub fn on_window_lost(&mut self) {
        self.gesture.reset_anchors();
        self.lifecycle.on_window_lost();
    }

    pub fn on_input_event(&mut self, event: &PointerEvent) -> Handled {
        match self.gesture.handle(event) {
            Ok(delta) => {
                if let Some(d) = delta {
                    log::trace!("gesture delta {d:?}");
                }
                Handled::Yes
            }
            Err(e) => {
                log::debug!("input ignored: {e}");
                Handled::No
            }
        }
    }

    /// Renders one frame if a surface is bound.
    ///
    /// Spin and zoom easing advance on every frame request while a surface is
    /// bound, including requests the backend skips. A fatal frame error drops
    /// the surface, and in-progress gestures with it.
    pub fn render_frame(&mut self) -> Option<FrameStats> {
        if !self.lifecycle.is_ready() {
            return None;
        }
        let time = self.clock.tick();
        self.lifecycle.advance(time.dt);
        self.gesture.advance_frame();

        let stats = self.lifecycle.request_frame(self.gesture.camera_transform());
        if !self.lifecycle.is_ready() {
            self.gesture.reset_anchors();
        }
        stats
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.lifecycle.on_resize(width, height);
        self.gesture.set_surface_size(width, height);
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    #[inline]
    pub fn gesture(&self) -> &GestureInterpreter {
        &self.gesture
    }

    #[inline]
    pub fn lifecycle(&self) -> &SurfaceLifecycle<B> {
        &self.lifecycle
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.lifecycle.scene_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::backend::SurfaceErrorAction;
    use crate::backend::recording::{Call, RecordingBackend};
    use crate::coords::{Color, Vec2};
    use crate::drawable::{Geometry, Material};
    use crate::gesture::{GestureConfig, ThrottlePolicy};
    use crate::input::PointerPhase;
    use crate::scene::{DrawableSpec, SceneSpec};

    fn engine() -> Engine<RecordingBackend> {
        let config = EngineConfig {
            gesture: GestureConfig {
                throttle: ThrottlePolicy::EveryNth(1),
                smoothing: 1.0,
                ..GestureConfig::default()
            },
            scene: SceneSpec::new().with(DrawableSpec::new(
                "tri",
                Geometry::triangle(Vec2::zero(), Color::RED),
                Material::flat(Color::RED),
            )),
            ..EngineConfig::default()
        };
        Engine::new(RecordingBackend::new(), config)
    }

    fn pointer(phase: PointerPhase, index: usize, pts: &[(f32, f32)], t: Instant) -> PointerEvent {
        PointerEvent::new(phase, index, pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect(), t)
    }

    #[test]
    fn render_is_a_no_op_while_idle() {
        let mut e = engine();
        assert_eq!(e.render_frame(), None);
        assert!(e.lifecycle().backend().calls.is_empty());
    }

    #[test]
    fn pan_reaches_the_draw_uniforms() {
        let mut e = engine();
        e.on_window_available(()).unwrap();
        let t = Instant::now();
        assert_eq!(e.on_input_event(&pointer(PointerPhase::Down, 0, &[(100.0, 100.0)], t)), Handled::Yes);
        e.on_input_event(&pointer(PointerPhase::Move, 0, &[(110.0, 100.0)], t + Duration::from_millis(5)));

        e.render_frame().unwrap();

        let draws = e.lifecycle().backend().draws();
        let translation = draws[0].transform[2];
        assert!((translation[0] - 0.02).abs() < 1e-5, "{translation:?}");
    }

    #[test]
    fn malformed_input_is_not_handled() {
        let mut e = engine();
        let t = Instant::now();
        assert_eq!(e.on_input_event(&pointer(PointerPhase::Move, 0, &[(1.0, 1.0)], t)), Handled::No);
        assert_eq!(e.on_input_event(&pointer(PointerPhase::Down, 3, &[(1.0, 1.0)], t)), Handled::No);
    }

    #[test]
    fn window_loss_cancels_drag_but_keeps_pan() {
        let mut e = engine();
        e.on_window_available(()).unwrap();
        let t = Instant::now();
        e.on_input_event(&pointer(PointerPhase::Down, 0, &[(0.0, 0.0)], t));
        e.on_input_event(&pointer(PointerPhase::Move, 0, &[(100.0, 0.0)], t));

        e.on_window_lost();
        assert_eq!(e.state(), LifecycleState::Idle);
        assert!(!e.gesture().state().is_tracking());
        assert!((e.gesture().state().pan().x - 0.1).abs() < 1e-5);

        e.on_window_available(()).unwrap();
        assert_eq!(e.on_input_event(&pointer(PointerPhase::Move, 0, &[(200.0, 0.0)], t)), Handled::No);
        assert!(e.render_frame().is_some());
    }

    #[test]
    fn fatal_frame_error_cancels_drag_but_keeps_pan() {
        let mut e = engine();
        e.on_window_available(()).unwrap();
        let t = Instant::now();
        e.on_input_event(&pointer(PointerPhase::Down, 0, &[(0.0, 0.0)], t));
        e.on_input_event(&pointer(PointerPhase::Move, 0, &[(100.0, 0.0)], t));

        e.lifecycle.backend_mut().frame_error = Some(SurfaceErrorAction::Fatal);
        assert_eq!(e.render_frame(), None);
        assert_eq!(e.state(), LifecycleState::Idle);
        assert!(!e.gesture().state().is_tracking());
        assert!((e.gesture().state().pan().x - 0.1).abs() < 1e-5);

        e.lifecycle.backend_mut().frame_error = None;
        e.on_window_available(()).unwrap();
        assert_eq!(e.on_input_event(&pointer(PointerPhase::Move, 0, &[(200.0, 0.0)], t)), Handled::No);
        assert!((e.gesture().state().pan().x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn skipped_frame_still_eases_zoom_and_keeps_drag() {
        let mut e = Engine::new(
            RecordingBackend::new(),
            EngineConfig {
                gesture: GestureConfig {
                    throttle: ThrottlePolicy::EveryNth(1),
                    ..GestureConfig::default()
                },
                ..EngineConfig::default()
            },
        );
        e.on_window_available(()).unwrap();
        let t = Instant::now();
        e.on_input_event(&pointer(PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)], t));
        e.on_input_event(&pointer(PointerPhase::Move, 1, &[(0.0, 0.0), (600.0, 0.0)], t));
        assert!((e.gesture().state().target_zoom() - 1.5).abs() < 1e-5);

        e.lifecycle.backend_mut().frame_error = Some(SurfaceErrorAction::SkipFrame);
        assert_eq!(e.render_frame(), None);
        assert_eq!(e.state(), LifecycleState::SurfaceReady);
        assert!((e.gesture().state().zoom() - 1.05).abs() < 1e-5);
        assert!(e.gesture().state().is_pinching());
    }

    #[test]
    fn resize_reaches_surface_and_gesture() {
        let mut e = engine();
        e.on_window_available(()).unwrap();
        e.on_resize(500, 250);
        assert_eq!(e.lifecycle().surface_size(), Some((500, 250)));
        assert_eq!(e.lifecycle().backend().count(|c| matches!(c, Call::Resize(500, 250))), 1);

        let t = Instant::now();
        e.on_input_event(&pointer(PointerPhase::Down, 0, &[(0.0, 0.0)], t));
        e.on_input_event(&pointer(PointerPhase::Move, 0, &[(50.0, 0.0)], t));
        assert!((e.gesture().state().pan().x - 0.1).abs() < 1e-5);
    }
}
