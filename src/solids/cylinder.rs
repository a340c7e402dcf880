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
    /// Tessellate a cylinder extruded along +z from the center of its base
    /// at `base`, optionally with end caps.
    pub fn cylinder(
        shader: Arc<ShaderEnum>,
        base: Point3f,
        radius: Float,
        height: Float,
        sides: usize,
        capped: bool,
    ) -> Result<Self, SolidError> {
        if sides < 3 {
            return Err(SolidError::InvalidParameter(format!(
                "cylinder tessellation needs at least 3 sides, got {sides}"
            )));
        }
        if radius <= 0.0 || height <= 0.0 {
            return Err(SolidError::InvalidParameter(format!(
                "cylinder radius and height must be positive, got {radius} and {height}"
            )));
        }

        let ring = |seg: usize, z: Float| {
            let phi = 2.0 * PI * seg as Float / sides as Float;
            base + Vec3f::new(radius * phi.cos(), radius * phi.sin(), z)
        };
        let cap_coords = |seg: usize| {
            let phi = 2.0 * PI * seg as Float / sides as Float;
            Point2f::new((phi.cos() + 1.0) / 2.0, (phi.sin() + 1.0) / 2.0)
        };

        let mut solid = Self::new(base);
        for (j0, j1) in (0..sides).circular_tuple_windows() {
            let b0 = ring(j0, 0.0);
            let b1 = ring(j1, 0.0);
            let t0 = ring(j0, height);
            let t1 = ring(j1, height);

            let u0 = j0 as Float / sides as Float;
            let u1 = j1 as Float / sides as Float;
            solid.push_quad(
                &shader,
                [b0, b1, t1, t0],
                [
                    Point2f::new(u0, 0.0),
                    Point2f::new(u1, 0.0),
                    Point2f::new(u1, 1.0),
                    Point2f::new(u0, 1.0),
                ],
            );

            if capped {
                let top_center = base + Vec3f::new(0.0, 0.0, height);
                solid.push(Triangle::build_with_coords(
                    shader.clone(),
                    top_center,
                    t0,
                    t1,
                    Point2f::new(0.5, 0.5),
                    cap_coords(j0),
                    cap_coords(j1),
                ));
                solid.push(Triangle::build_with_coords(
                    shader.clone(),
                    base,
                    b1,
                    b0,
                    Point2f::new(0.5, 0.5),
                    cap_coords(j1),
                    cap_coords(j0),
                ));
            }
        }

        Ok(solid)
    }
}
