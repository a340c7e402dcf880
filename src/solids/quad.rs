use std::sync::Arc;

use crate::{
    math::{Point2f, Point3f},
    shading::ShaderEnum,
};

use super::Solid;

impl Solid {
    /// A free-standing quad, split into two triangles. Corners are
    /// counter-clockwise as seen from the front.
    pub fn quad(shader: Arc<ShaderEnum>, a: Point3f, b: Point3f, c: Point3f, d: Point3f) -> Self {
        let pivot = a + ((b - a) + (c - a) + (d - a)) / 4.0;

        let mut solid = Self::new(pivot);
        solid.push_quad(
            &shader,
            [a, b, c, d],
            [
                Point2f::new(0.0, 0.0),
                Point2f::new(1.0, 0.0),
                Point2f::new(1.0, 1.0),
                Point2f::new(0.0, 1.0),
            ],
        );

        solid
    }
}
