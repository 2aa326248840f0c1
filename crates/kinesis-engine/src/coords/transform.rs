use core::ops::Mul;

use super::Vec2;

/// 2D affine transform stored as a column-major 3×3 matrix.
///
/// Convention: column vectors, `p' = M · p`. `a * b` applies `b` first, then
/// `a`. The bottom row is always `[0, 0, 1]` for transforms built from the
/// constructors below.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    /// `cols[c][r]`: column `c`, row `r`.
    cols: [[f32; 3]; 3],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        cols: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub const fn translate(dx: f32, dy: f32) -> Self {
        Self {
            cols: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [dx, dy, 1.0]],
        }
    }

    /// Counter-clockwise rotation by `theta` radians.
    #[inline]
    pub fn rotate(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self {
            cols: [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            cols: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[inline]
    pub const fn uniform_scale(s: f32) -> Self {
        Self::scale(s, s)
    }

    /// Returns `a * b`: applies `b`, then `a`.
    pub fn compose(a: Transform, b: Transform) -> Transform {
        let mut out = [[0.0f32; 3]; 3];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = a.cols[0][r] * b.cols[c][0]
                    + a.cols[1][r] * b.cols[c][1]
                    + a.cols[2][r] * b.cols[c][2];
            }
        }
        Transform { cols: out }
    }

    /// Applies `self`, then `next`.
    #[inline]
    pub fn then(self, next: Transform) -> Transform {
        Transform::compose(next, self)
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.cols;
        Vec2::new(
            m[0][0] * p.x + m[1][0] * p.y + m[2][0],
            m[0][1] * p.x + m[1][1] * p.y + m[2][1],
        )
    }

    /// Translation component.
    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.cols[2][0], self.cols[2][1])
    }

    /// Element-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Transform, eps: f32) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Layout of a WGSL `mat3x3<f32>` in a uniform buffer: three columns, each
    /// padded to 16 bytes.
    pub fn to_gpu(&self) -> [[f32; 4]; 3] {
        let [c0, c1, c2] = self.cols;
        [
            [c0[0], c0[1], c0[2], 0.0],
            [c1[0], c1[1], c1[2], 0.0],
            [c2[0], c2[1], c2[2], 0.0],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;
    #[inline]
    fn mul(self, rhs: Transform) -> Transform {
        Transform::compose(self, rhs)
    }
}
