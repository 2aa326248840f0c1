use core::f32::consts::TAU;

use crate::coords::Transform;
use crate::drawable::Drawable;

/// Position of a drawable in its scene. Stable for the scene's lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) struct Entity {
    pub drawable: Drawable,
    pub local: Transform,
    /// Radians per second, counter-clockwise.
    pub spin: f32,
    /// Accumulated spin in `[0, 2π)`.
    pub angle: f32,
    /// A skip has been logged since the drawable last drew.
    pub skip_logged: bool,
}

impl Entity {
    pub fn new(drawable: Drawable) -> Self {
        Self {
            drawable,
            local: Transform::IDENTITY,
            spin: 0.0,
            angle: 0.0,
            skip_logged: false,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.spin != 0.0 {
            self.angle = (self.angle + self.spin * dt).rem_euclid(TAU);
        }
    }

    /// Local transform with the spin applied first (about the entity origin).
    pub fn model(&self) -> Transform {
        if self.angle == 0.0 {
            self.local
        } else {
            self.local * Transform::rotate(self.angle)
        }
    }
}
