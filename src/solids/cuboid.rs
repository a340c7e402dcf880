use std::sync::Arc;

use crate::{
    math::{Point2f, Point3f, Vec3f},
    shading::ShaderEnum,
    Float,
};

use super::{Solid, SolidError};

impl Solid {
    /// An axis-aligned box solid centered at `center` with the given full
    /// side lengths.
    pub fn cuboid(
        shader: Arc<ShaderEnum>,
        center: Point3f,
        width: Float,
        height: Float,
        depth: Float,
    ) -> Result<Self, SolidError> {
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(SolidError::InvalidParameter(format!(
                "cuboid side lengths must be positive, got {width} x {height} x {depth}"
            )));
        }

        let p = |sx: Float, sy: Float, sz: Float| {
            center + Vec3f::new(sx * width / 2.0, sy * height / 2.0, sz * depth / 2.0)
        };
        let coords = [
            Point2f::new(0.0, 0.0),
            Point2f::new(1.0, 0.0),
            Point2f::new(1.0, 1.0),
            Point2f::new(0.0, 1.0),
        ];

        let mut solid = Self::new(center);
        // Corners counter-clockwise as seen from outside each face
        let faces = [
            // +x / -x
            [p(1.0, -1.0, -1.0), p(1.0, 1.0, -1.0), p(1.0, 1.0, 1.0), p(1.0, -1.0, 1.0)],
            [p(-1.0, -1.0, -1.0), p(-1.0, -1.0, 1.0), p(-1.0, 1.0, 1.0), p(-1.0, 1.0, -1.0)],
            // +y / -y
            [p(-1.0, 1.0, -1.0), p(-1.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, -1.0)],
            [p(-1.0, -1.0, -1.0), p(1.0, -1.0, -1.0), p(1.0, -1.0, 1.0), p(-1.0, -1.0, 1.0)],
            // +z / -z
            [p(-1.0, -1.0, 1.0), p(1.0, -1.0, 1.0), p(1.0, 1.0, 1.0), p(-1.0, 1.0, 1.0)],
            [p(-1.0, -1.0, -1.0), p(-1.0, 1.0, -1.0), p(1.0, 1.0, -1.0), p(1.0, -1.0, -1.0)],
        ];
        for face in faces {
            solid.push_quad(&shader, face, coords);
        }

        Ok(solid)
    }
}
