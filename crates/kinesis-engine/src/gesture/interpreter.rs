use core::f32::consts::{PI, TAU};

use crate::coords::{Transform, Vec2};
use crate::input::{InputDecodeError, PointerEvent, PointerPhase};

use super::state::{Pending, Track};
use super::{GestureConfig, GestureState};

/// Snap distance for zoom easing.
const ZOOM_EPSILON: f32 = 1e-4;

/// Pinch distances below this are treated as coincident pointers.
const MIN_PINCH_DISTANCE: f32 = 1e-3;

/// Transform change applied by one accepted event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureDelta {
    /// Pan change in surface units.
    pub pan: Vec2,
    /// Ratio of new to previous pinch distance.
    pub scale: f32,
    /// Rotation change in radians, counter-clockwise.
    pub rotation: f32,
}

impl GestureDelta {
    fn from_pending(p: Pending) -> Self {
        Self {
            pan: p.pan,
            scale: p.scale,
            rotation: p.angle,
        }
    }
}

/// Converts pointer events into pan/zoom/rotation.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    state: GestureState,
    surface: (u32, u32),
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        let config = config.sanitized();
        let state = GestureState::new(config.clamp_zoom(1.0));
        Self {
            config,
            state,
            surface: (0, 0),
        }
    }

    #[inline]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Pixel size used to normalize pan. Pans are ignored while either side is zero.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    /// Feeds one event. Returns the delta applied, or `None` when the event only
    /// changed tracking (down/up) or was throttled.
    pub fn handle(&mut self, event: &PointerEvent) -> Result<Option<GestureDelta>, InputDecodeError> {
        event.validate()?;

        match event.phase {
            PointerPhase::Down => {
                if event.index >= 2 {
                    log::trace!("gesture: ignoring extra pointer {}", event.index);
                    return Ok(None);
                }
                let flushed = self.flush_pending();
                self.seed(&event.positions);
                Ok(flushed)
            }
            PointerPhase::Move => self.on_move(event),
            PointerPhase::Up => {
                if event.index >= 2 {
                    return Ok(None);
                }
                let flushed = self.flush_pending();
                let remaining: Vec<Vec2> = event
                    .positions
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != event.index)
                    .map(|(_, p)| *p)
                    .collect();
                self.seed(&remaining);
                Ok(flushed)
            }
            PointerPhase::Cancel => {
                self.reset_anchors();
                Ok(None)
            }
        }
    }

    fn on_move(&mut self, event: &PointerEvent) -> Result<Option<GestureDelta>, InputDecodeError> {
        if event.index >= 2 {
            return Ok(None);
        }
        let tracked = &event.positions[..event.positions.len().min(2)];

        match (self.state.track, tracked) {
            (Track::Idle, _) => Err(InputDecodeError::MoveWithoutDown),
            (Track::Pan { anchor }, [p]) => Ok(self.pan_move(anchor, *p, event)),
            (Track::Pinch { distance, angle }, [a, b]) => {
                Ok(self.pinch_move(distance, angle, *a, *b, event))
            }
            _ => {
                // Pointer count changed without a down/up (dropped event).
                log::debug!("gesture: pointer count changed mid-gesture; re-anchoring");
                let flushed = self.flush_pending();
                self.seed(tracked);
                Ok(flushed)
            }
        }
    }

    fn pan_move(&mut self, anchor: Vec2, p: Vec2, event: &PointerEvent) -> Option<GestureDelta> {
        self.state.track = Track::Pan { anchor: p };
        self.state.pointers = [Some(p), None];

        let (w, h) = self.surface;
        if w == 0 || h == 0 {
            return None;
        }
        let d = p - anchor;
        let k = self.config.pan_sensitivity / self.state.zoom;
        self.state.pending.pan += Vec2::new(d.x / w as f32, -d.y / h as f32) * k;

        self.accept(event)
    }

    fn pinch_move(
        &mut self,
        last_distance: f32,
        last_angle: f32,
        a: Vec2,
        b: Vec2,
        event: &PointerEvent,
    ) -> Option<GestureDelta> {
        self.state.pointers = [Some(a), Some(b)];

        let distance = a.distance(b);
        if distance < MIN_PINCH_DISTANCE {
            return None;
        }
        let angle = pinch_angle(a, b);
        self.state.track = Track::Pinch { distance, angle };
        if last_distance < MIN_PINCH_DISTANCE {
            return None;
        }

        let pending = &mut self.state.pending;
        pending.scale *= distance / last_distance;
        pending.distance += distance - last_distance;
        pending.angle += wrap_angle(angle - last_angle);

        self.accept(event)
    }

    fn accept(&mut self, event: &PointerEvent) -> Option<GestureDelta> {
        if !self.state.admit(self.config.throttle, event.time) {
            return None;
        }
        self.apply_pending()
    }

    /// Applies pending displacement without consulting the throttle.
    fn flush_pending(&mut self) -> Option<GestureDelta> {
        self.apply_pending()
    }

    fn apply_pending(&mut self) -> Option<GestureDelta> {
        let p = std::mem::replace(&mut self.state.pending, Pending::NONE);
        if p.is_none() {
            return None;
        }
        let s = &mut self.state;
        s.pan += p.pan;
        s.target_zoom = self
            .config
            .clamp_zoom(s.target_zoom + p.distance * self.config.zoom_sensitivity);
        s.rotation = (s.rotation + p.angle).rem_euclid(TAU);
        Some(GestureDelta::from_pending(p))
    }

    /// Starts tracking `active` (the first two are used).
    fn seed(&mut self, active: &[Vec2]) {
        let s = &mut self.state;
        s.track = match active {
            [] => Track::Idle,
            [p] => Track::Pan { anchor: *p },
            [a, b, ..] => Track::Pinch {
                distance: a.distance(*b),
                angle: pinch_angle(*a, *b),
            },
        };
        s.pointers = [active.first().copied(), active.get(1).copied()];
        s.restart_throttle();
    }

    /// Eases the applied zoom toward its target. Call once per rendered frame.
    pub fn advance_frame(&mut self) {
        let s = &mut self.state;
        let gap = s.target_zoom - s.zoom;
        if gap.abs() <= ZOOM_EPSILON {
            s.zoom = s.target_zoom;
        } else {
            s.zoom += gap * self.config.smoothing;
        }
    }

    /// Camera transform for the current accumulators: rotate about the scene
    /// origin, translate by the pan (NDC spans 2 units), then zoom.
    pub fn camera_transform(&self) -> Transform {
        let s = &self.state;
        Transform::uniform_scale(s.zoom)
            * Transform::translate(s.pan.x * 2.0, s.pan.y * 2.0)
            * Transform::rotate(s.rotation)
    }

    /// Drops pointer tracking and unapplied displacement; accumulators stay.
    pub fn reset_anchors(&mut self) {
        let s = &mut self.state;
        s.track = Track::Idle;
        s.pointers = [None; 2];
        s.pending = Pending::NONE;
        s.restart_throttle();
    }

    /// Back to the initial pose.
    pub fn reset(&mut self) {
        self.state = GestureState::new(self.config.clamp_zoom(1.0));
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Angle of `a -> b` with screen y flipped, so positive is counter-clockwise.
fn pinch_angle(a: Vec2, b: Vec2) -> f32 {
    Vec2::new(a.x, -a.y).angle_to(Vec2::new(b.x, -b.y))
}

/// Wraps into `(-π, π]`.
fn wrap_angle(a: f32) -> f32 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w <= -PI { w + TAU } else { w }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::ThrottlePolicy;
    use std::time::{Duration, Instant};

    const EPS: f32 = 1e-5;

    struct Feed {
        g: GestureInterpreter,
        t0: Instant,
    }

    impl Feed {
        fn new(config: GestureConfig) -> Self {
            let mut g = GestureInterpreter::new(config);
            g.set_surface_size(1000, 1000);
            Self { g, t0: Instant::now() }
        }

        fn unthrottled() -> Self {
            Self::new(GestureConfig {
                throttle: ThrottlePolicy::EveryNth(1),
                ..GestureConfig::default()
            })
        }

        fn send(
            &mut self,
            ms: u64,
            phase: PointerPhase,
            index: usize,
            pts: &[(f32, f32)],
        ) -> Result<Option<GestureDelta>, InputDecodeError> {
            let positions = pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let e = PointerEvent::new(phase, index, positions, self.t0 + Duration::from_millis(ms));
            self.g.handle(&e)
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    // ── pan ───────────────────────────────────────────────────────────────

    #[test]
    fn single_pointer_pan_is_surface_normalized() {
        let mut f = Feed::new(GestureConfig::default());
        f.send(0, PointerPhase::Down, 0, &[(100.0, 100.0)]).unwrap();
        let d = f.send(16, PointerPhase::Move, 0, &[(110.0, 100.0)]).unwrap().unwrap();

        assert!(close(d.pan.x, 0.01) && close(d.pan.y, 0.0), "{d:?}");
        assert!(close(f.g.state().pan().x, 0.01));
    }

    #[test]
    fn pan_y_is_up_positive() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 0, &[(0.0, 500.0)]).unwrap();
        f.send(1, PointerPhase::Move, 0, &[(0.0, 400.0)]).unwrap();
        assert!(close(f.g.state().pan().y, 0.1));
    }

    #[test]
    fn pan_is_divided_by_zoom() {
        let mut f = Feed::unthrottled();
        f.g.state.zoom = 2.0;
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Move, 0, &[(100.0, 0.0)]).unwrap();
        assert!(close(f.g.state().pan().x, 0.05));
    }

    #[test]
    fn zero_sized_surface_ignores_pan() {
        let mut f = Feed::unthrottled();
        f.g.set_surface_size(0, 0);
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        assert_eq!(f.send(1, PointerPhase::Move, 0, &[(50.0, 0.0)]).unwrap(), None);
        assert_eq!(f.g.state().pan(), Vec2::zero());
    }

    // ── throttling ────────────────────────────────────────────────────────

    #[test]
    fn throttled_moves_are_coalesced_not_lost() {
        let mut f = Feed::new(GestureConfig::default());
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        assert!(f.send(10, PointerPhase::Move, 0, &[(10.0, 0.0)]).unwrap().is_some());
        assert!(f.send(20, PointerPhase::Move, 0, &[(20.0, 0.0)]).unwrap().is_none());
        assert!(f.send(30, PointerPhase::Move, 0, &[(30.0, 0.0)]).unwrap().is_none());
        assert!(close(f.g.state().pan().x, 0.01));

        let d = f.send(60, PointerPhase::Move, 0, &[(40.0, 0.0)]).unwrap().unwrap();
        assert!(close(d.pan.x, 0.03));
        assert!(close(f.g.state().pan().x, 0.04));
    }

    #[test]
    fn up_flushes_pending_displacement() {
        let mut f = Feed::new(GestureConfig::default());
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        f.send(10, PointerPhase::Move, 0, &[(10.0, 0.0)]).unwrap();
        f.send(20, PointerPhase::Move, 0, &[(30.0, 0.0)]).unwrap();
        let d = f.send(25, PointerPhase::Up, 0, &[(30.0, 0.0)]).unwrap().unwrap();
        assert!(close(d.pan.x, 0.02));
        assert!(close(f.g.state().pan().x, 0.03));
    }

    #[test]
    fn every_nth_policy_bounds_updates() {
        let mut f = Feed::new(GestureConfig {
            throttle: ThrottlePolicy::EveryNth(3),
            ..GestureConfig::default()
        });
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        let applied = (1..=6)
            .filter(|i| {
                f.send(0, PointerPhase::Move, 0, &[(*i as f32, 0.0)])
                    .unwrap()
                    .is_some()
            })
            .count();
        assert_eq!(applied, 2);
        assert!(close(f.g.state().pan().x, 0.004));
    }

    // ── pinch ─────────────────────────────────────────────────────────────

    #[test]
    fn pinch_scale_and_target_zoom() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 0, &[(100.0, 100.0)]).unwrap();
        f.send(1, PointerPhase::Down, 1, &[(100.0, 100.0), (200.0, 100.0)]).unwrap();
        let d = f
            .send(2, PointerPhase::Move, 1, &[(100.0, 100.0), (250.0, 100.0)])
            .unwrap()
            .unwrap();

        assert!(close(d.scale, 1.5));
        assert!(close(f.g.state().target_zoom(), 1.05));
        assert!(close(f.g.state().zoom(), 1.0));
    }

    #[test]
    fn target_zoom_is_clamped() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Move, 1, &[(0.0, 0.0), (5000.0, 0.0)]).unwrap();
        assert_eq!(f.g.state().target_zoom(), 2.0);
        f.send(2, PointerPhase::Move, 1, &[(0.0, 0.0), (1.0, 0.0)]).unwrap();
        assert_eq!(f.g.state().target_zoom(), 1.0);
    }

    #[test]
    fn twist_rotates_counter_clockwise() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        // Second finger moves up the screen: counter-clockwise.
        let d = f
            .send(1, PointerPhase::Move, 1, &[(0.0, 0.0), (0.0, -100.0)])
            .unwrap()
            .unwrap();
        assert!(close(d.rotation, core::f32::consts::FRAC_PI_2));
        assert!(close(f.g.state().rotation(), core::f32::consts::FRAC_PI_2));
    }

    #[test]
    fn angle_delta_wraps_across_pi() {
        assert!(close(wrap_angle(3.0 * PI / 2.0), -PI / 2.0));
        assert!(close(wrap_angle(PI), PI));
        assert!(close(wrap_angle(-PI), PI));
    }

    #[test]
    fn zero_distance_is_a_no_op_sample() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        let before = f.g.state().clone();
        assert_eq!(f.send(1, PointerPhase::Move, 1, &[(50.0, 0.0), (50.0, 0.0)]).unwrap(), None);
        assert_eq!(f.g.state().target_zoom(), before.target_zoom());
        assert!(f.g.state().target_zoom().is_finite());
    }

    #[test]
    fn third_pointer_is_ignored() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        let pts = [(0.0, 0.0), (100.0, 0.0), (500.0, 500.0)];
        assert_eq!(f.send(1, PointerPhase::Down, 2, &pts).unwrap(), None);
        assert_eq!(f.send(2, PointerPhase::Move, 2, &[(0.0, 0.0), (100.0, 0.0), (900.0, 900.0)]).unwrap(), None);
        assert!(f.g.state().is_pinching());
        assert_eq!(f.g.state().target_zoom(), 1.0);
    }

    // ── gesture end ───────────────────────────────────────────────────────

    #[test]
    fn up_does_not_reset_accumulators() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Move, 1, &[(0.0, 0.0), (300.0, 0.0)]).unwrap();
        f.send(2, PointerPhase::Up, 1, &[(0.0, 0.0), (300.0, 0.0)]).unwrap();
        f.send(3, PointerPhase::Up, 0, &[(0.0, 0.0)]).unwrap();

        assert!(!f.g.state().is_tracking());
        assert!(close(f.g.state().target_zoom(), 1.2));
    }

    #[test]
    fn cancel_mid_pinch_keeps_accumulators_and_drops_pending() {
        let mut f = Feed::new(GestureConfig::default());
        f.send(0, PointerPhase::Down, 0, &[(100.0, 0.0)]).unwrap();
        f.send(10, PointerPhase::Move, 0, &[(200.0, 0.0)]).unwrap();
        f.send(20, PointerPhase::Down, 1, &[(200.0, 0.0), (300.0, 0.0)]).unwrap();
        // Same distance, second finger swung a quarter turn counter-clockwise.
        f.send(30, PointerPhase::Move, 1, &[(200.0, 0.0), (200.0, -100.0)]).unwrap();
        // Throttled: the spread only reaches the pending delta.
        let throttled = f
            .send(40, PointerPhase::Move, 1, &[(200.0, 0.0), (200.0, -400.0)])
            .unwrap();
        assert_eq!(throttled, None);

        assert_eq!(f.send(45, PointerPhase::Cancel, 0, &[]).unwrap(), None);

        let s = f.g.state();
        assert!(!s.is_tracking());
        assert!(close(s.pan().x, 0.1));
        assert!(close(s.rotation(), core::f32::consts::FRAC_PI_2));
        assert!(close(s.target_zoom(), 1.0));
        assert_eq!(
            f.send(50, PointerPhase::Move, 1, &[(200.0, 0.0), (200.0, -500.0)]),
            Err(InputDecodeError::MoveWithoutDown)
        );

        // Nothing left to flush on the next down/up.
        assert_eq!(f.send(60, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap(), None);
        assert_eq!(f.send(70, PointerPhase::Up, 0, &[(0.0, 0.0)]).unwrap(), None);
        assert!(close(f.g.state().target_zoom(), 1.0));
    }

    #[test]
    fn remaining_pointer_becomes_pan_anchor() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Up, 0, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        let d = f.send(2, PointerPhase::Move, 0, &[(110.0, 0.0)]).unwrap().unwrap();
        assert!(close(d.pan.x, 0.01));
    }

    #[test]
    fn move_without_down_is_rejected() {
        let mut f = Feed::unthrottled();
        assert_eq!(
            f.send(0, PointerPhase::Move, 0, &[(1.0, 1.0)]),
            Err(InputDecodeError::MoveWithoutDown)
        );
    }

    #[test]
    fn reset_anchors_keeps_accumulators() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Move, 0, &[(100.0, 0.0)]).unwrap();
        f.g.reset_anchors();

        assert!(!f.g.state().is_tracking());
        assert!(close(f.g.state().pan().x, 0.1));
        assert!(f.send(2, PointerPhase::Move, 0, &[(200.0, 0.0)]).is_err());
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 0, &[(0.0, 0.0)]).unwrap();
        f.send(1, PointerPhase::Move, 0, &[(100.0, 0.0)]).unwrap();
        f.g.reset();
        assert!(f.g.camera_transform().approx_eq(&Transform::IDENTITY, EPS));
    }

    // ── smoothing ─────────────────────────────────────────────────────────

    #[test]
    fn zoom_converges_monotonically_within_range() {
        let mut f = Feed::unthrottled();
        f.send(0, PointerPhase::Down, 1, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();

        let spreads = [400.0, 900.0, 50.0, 1500.0, 700.0];
        for (i, spread) in spreads.iter().enumerate() {
            f.send(i as u64 + 1, PointerPhase::Move, 1, &[(0.0, 0.0), (*spread, 0.0)]).unwrap();
            let target = f.g.state().target_zoom();
            for _ in 0..30 {
                let before = f.g.state().zoom();
                f.g.advance_frame();
                let after = f.g.state().zoom();
                assert!((target - after).abs() <= (target - before).abs());
                assert!((1.0..=2.0).contains(&after));
                if before <= target {
                    assert!(after >= before && after <= target);
                } else {
                    assert!(after <= before && after >= target);
                }
            }
        }
    }

    #[test]
    fn zoom_snaps_to_target() {
        let mut f = Feed::unthrottled();
        f.g.state.target_zoom = 1.5;
        for _ in 0..500 {
            f.g.advance_frame();
        }
        assert_eq!(f.g.state().zoom(), 1.5);
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn camera_pans_in_ndc_and_zooms() {
        let mut f = Feed::unthrottled();
        f.g.state.pan = Vec2::new(0.1, 0.0);
        f.g.state.zoom = 2.0;
        let p = f.g.camera_transform().transform_point(Vec2::new(0.1, 0.0));
        assert!(close(p.x, 0.6) && close(p.y, 0.0), "{p:?}");
    }
}
