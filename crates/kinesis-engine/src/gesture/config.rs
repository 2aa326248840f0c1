use std::time::Duration;

/// Rate limit for input-derived transform updates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ThrottlePolicy {
    /// At most one accepted move per interval.
    Interval(Duration),
    /// The first move of a gesture, then every nth.
    EveryNth(u32),
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::Interval(Duration::from_millis(50))
    }
}

/// Gesture tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Multiplier on surface-normalized pan.
    pub pan_sensitivity: f32,
    /// Target zoom change per pixel of pinch distance change.
    pub zoom_sensitivity: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Per-frame easing factor in (0, 1]; 1 disables smoothing.
    pub smoothing: f32,
    pub throttle: ThrottlePolicy,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pan_sensitivity: 1.0,
            zoom_sensitivity: 0.001,
            min_zoom: 1.0,
            max_zoom: 2.0,
            smoothing: 0.1,
            throttle: ThrottlePolicy::default(),
        }
    }
}

impl GestureConfig {
    /// Repairs inconsistent values (swapped zoom range, out-of-range smoothing).
    pub fn sanitized(mut self) -> Self {
        if self.min_zoom > self.max_zoom {
            log::warn!(
                "gesture: min_zoom {} > max_zoom {}; swapping",
                self.min_zoom,
                self.max_zoom
            );
            core::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            log::warn!("gesture: smoothing {} outside (0, 1]; using 1", self.smoothing);
            self.smoothing = 1.0;
        }
        if let ThrottlePolicy::EveryNth(0) = self.throttle {
            self.throttle = ThrottlePolicy::EveryNth(1);
        }
        self
    }

    #[inline]
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
