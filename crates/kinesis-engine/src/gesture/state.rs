use std::time::Instant;

use crate::coords::Vec2;

use super::ThrottlePolicy;

/// What the current pointers are doing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Track {
    Idle,
    Pan { anchor: Vec2 },
    Pinch { distance: f32, angle: f32 },
}

/// Input displacement seen by suppressed events, applied by the next accepted one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Pending {
    pub pan: Vec2,
    pub distance: f32,
    pub angle: f32,
    pub scale: f32,
}

impl Pending {
    pub const NONE: Pending = Pending {
        pan: Vec2::zero(),
        distance: 0.0,
        angle: 0.0,
        scale: 1.0,
    };

    pub fn is_none(&self) -> bool {
        *self == Pending::NONE
    }
}

/// Gesture accumulators and pointer tracking.
///
/// Accumulators (`pan`, `zoom`, `target_zoom`, `rotation`) persist until
/// `GestureInterpreter::reset`; tracking state is dropped whenever a gesture
/// ends or is cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub(crate) track: Track,
    pub(crate) pointers: [Option<Vec2>; 2],
    pub(crate) pending: Pending,

    pub(crate) pan: Vec2,
    pub(crate) zoom: f32,
    pub(crate) target_zoom: f32,
    pub(crate) rotation: f32,

    pub(crate) last_accepted: Option<Instant>,
    pub(crate) moves: u64,
}

impl GestureState {
    pub(crate) fn new(zoom: f32) -> Self {
        Self {
            track: Track::Idle,
            pointers: [None; 2],
            pending: Pending::NONE,
            pan: Vec2::zero(),
            zoom,
            target_zoom: zoom,
            rotation: 0.0,
            last_accepted: None,
            moves: 0,
        }
    }

    /// Pan offset in surface units (1.0 = full width/height), y up.
    #[inline]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Applied (smoothed) zoom.
    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    /// Accumulated rotation in `[0, 2π)`, counter-clockwise.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Last known positions of the (up to two) tracked pointers.
    pub fn pointers(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.pointers.iter().flatten().copied()
    }

    pub fn is_tracking(&self) -> bool {
        self.track != Track::Idle
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.track, Track::Pinch { .. })
    }

    /// Number of moves seen since the gesture (re)started.
    #[inline]
    pub fn move_count(&self) -> u64 {
        self.moves
    }

    pub(crate) fn restart_throttle(&mut self) {
        self.last_accepted = None;
        self.moves = 0;
    }

    /// Counts one move and decides whether it may mutate the transform.
    pub(crate) fn admit(&mut self, policy: ThrottlePolicy, now: Instant) -> bool {
        self.moves += 1;
        match policy {
            ThrottlePolicy::Interval(min) => match self.last_accepted {
                Some(at) if now.saturating_duration_since(at) < min => false,
                _ => {
                    self.last_accepted = Some(now);
                    true
                }
            },
            ThrottlePolicy::EveryNth(n) => {
                let n = u64::from(n.max(1));
                let accepted = (self.moves - 1) % n == 0;
                if accepted {
                    self.last_accepted = Some(now);
                }
                accepted
            }
        }
    }
}
