use crate::backend::Vertex;
use crate::coords::{Color, Vec2};

/// CPU-side vertex data (triangle list, NDC).
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// The classic upright triangle: apex at `(0, 0.5)`, base from `(-0.5, -0.5)`
    /// to `(0.5, -0.5)`, offset by `offset`.
    pub fn triangle(offset: Vec2, color: Color) -> Self {
        let pts = [Vec2::new(0.0, 0.5), Vec2::new(-0.5, -0.5), Vec2::new(0.5, -0.5)];
        Self::new(pts.iter().map(|p| Vertex::new(*p + offset, color)).collect())
    }

    /// Axis-aligned quad centred on `center`, as two counter-clockwise triangles.
    pub fn quad(center: Vec2, size: Vec2, color: Color) -> Self {
        let hx = size.x * 0.5;
        let hy = size.y * 0.5;
        let bl = center + Vec2::new(-hx, -hy);
        let br = center + Vec2::new(hx, -hy);
        let tr = center + Vec2::new(hx, hy);
        let tl = center + Vec2::new(-hx, hy);
        Self::new(
            [bl, br, tr, bl, tr, tl]
                .iter()
                .map(|p| Vertex::new(*p, color))
                .collect(),
        )
    }

    /// Per-vertex coloured triangle (one colour per corner).
    pub fn gradient_triangle(offset: Vec2, colors: [Color; 3]) -> Self {
        let pts = [Vec2::new(0.0, 0.5), Vec2::new(-0.5, -0.5), Vec2::new(0.5, -0.5)];
        Self::new(
            pts.iter()
                .zip(colors)
                .map(|(p, c)| Vertex::new(*p + offset, c))
                .collect(),
        )
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_applies_offset() {
        let g = Geometry::triangle(Vec2::new(0.25, 0.0), Color::RED);
        assert_eq!(g.len(), 3);
        assert_eq!(g.vertices()[0].position, [0.25, 0.5]);
        assert_eq!(g.vertices()[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn quad_is_two_triangles() {
        let g = Geometry::quad(Vec2::zero(), Vec2::new(1.0, 0.5), Color::WHITE);
        assert_eq!(g.len(), 6);
        assert_eq!(g.vertices()[0].position, [-0.5, -0.25]);
        assert_eq!(g.vertices()[2].position, [0.5, 0.25]);
    }
}
