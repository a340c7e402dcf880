use std::sync::Arc;

use itertools::Itertools;

use crate::{
    float::PI,
    math::{Point2f, Point3f, Vec3f},
    primitives::Triangle,
    shading::ShaderEnum,
    Float,
};

use super::{Solid, SolidError};

impl Solid {
    /// Tessellate a sphere into `sides` longitudinal segments and `sides`
    /// latitudinal bands of triangles, wound outward.
    pub fn sphere(
        shader: Arc<ShaderEnum>,
        center: Point3f,
        radius: Float,
        sides: usize,
    ) -> Result<Self, SolidError> {
        if sides < 3 {
            return Err(SolidError::InvalidParameter(format!(
                "sphere tessellation needs at least 3 sides, got {sides}"
            )));
        }
        if radius <= 0.0 {
            return Err(SolidError::InvalidParameter(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }

        let bands = sides;
        let vertex = |band: usize, seg: usize| {
            let theta = PI * band as Float / bands as Float;
            let phi = 2.0 * PI * seg as Float / sides as Float;
            center
                + Vec3f::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                ) * radius
        };
        let coords = |band: usize, seg: usize| {
            Point2f::new(
                seg as Float / sides as Float,
                band as Float / bands as Float,
            )
        };

        let mut solid = Self::new(center);
        for band in 0..bands {
            for (j0, j1) in (0..sides).circular_tuple_windows() {
                let p00 = vertex(band, j0);
                let p10 = vertex(band + 1, j0);
                let p11 = vertex(band + 1, j1);
                let p01 = vertex(band, j1);
                let c00 = coords(band, j0);
                let c10 = coords(band + 1, j0);
                let c11 = coords(band + 1, j1);
                let c01 = coords(band, j1);

                if band == 0 {
                    // Top cap: the band collapses to a fan around the pole
                    solid.push(Triangle::build_with_coords(
                        shader.clone(),
                        p00,
                        p10,
                        p11,
                        c00,
                        c10,
                        c11,
                    ));
                } else if band == bands - 1 {
                    // Bottom cap
                    solid.push(Triangle::build_with_coords(
                        shader.clone(),
                        p00,
                        p10,
                        p01,
                        c00,
                        c10,
                        c01,
                    ));
                } else {
                    solid.push_quad(&shader, [p00, p10, p11, p01], [c00, c10, c11, c01]);
                }
            }
        }

        Ok(solid)
    }
}
