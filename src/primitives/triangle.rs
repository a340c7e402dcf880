use std::sync::{Arc, RwLock, Weak};

use crate::{
    float::RAY_EPSILON,
    geometry::{Bounds3f, Ray, Transform},
    math::{Normal3f, Point2f, Point3f, Vec3f},
    shading::ShaderEnum,
    Float,
};

use super::{PrimRef, Primitive, PrimitiveEnum};

/// A single triangle with per-vertex texture coordinates.
///
/// Vertices are ordered counter-clockwise as seen from outside the solid,
/// so the geometric normal points outward.
#[derive(Debug)]
pub struct Triangle {
    shader: Arc<ShaderEnum>,
    a: Point3f,
    b: Point3f,
    c: Point3f,
    ta: Point2f,
    tb: Point2f,
    tc: Point2f,
    // Backreference for committing `ray.hit` to this primitive.
    me: Weak<RwLock<PrimitiveEnum>>,
}

impl Triangle {
    /// Construct a triangle with zeroed texture coordinates.
    pub fn build(shader: Arc<ShaderEnum>, a: Point3f, b: Point3f, c: Point3f) -> PrimRef {
        Self::build_with_coords(
            shader,
            a,
            b,
            c,
            Point2f::ZERO,
            Point2f::ZERO,
            Point2f::ZERO,
        )
    }

    /// Construct a triangle with per-vertex texture coordinates.
    #[allow(clippy::too_many_arguments)]
    pub fn build_with_coords(
        shader: Arc<ShaderEnum>,
        a: Point3f,
        b: Point3f,
        c: Point3f,
        ta: Point2f,
        tb: Point2f,
        tc: Point2f,
    ) -> PrimRef {
        Arc::new_cyclic(|me| {
            RwLock::new(PrimitiveEnum::Triangle(Self {
                shader,
                a,
                b,
                c,
                ta,
                tb,
                tc,
                me: me.clone(),
            }))
        })
    }

    /// Möller-Trumbore ray-triangle test.
    ///
    /// Returns `(t, u, v, det)` of the crossing; the sign of `det` tells
    /// the facing (`det > 0` means the surface faces the ray). `None` for
    /// parallel or outside-the-triangle rays.
    fn crossing(&self, ray: &Ray) -> Option<(Float, Float, Float, Float)> {
        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let pvec = ray.dir.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.o - self.a;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(edge1);
        let v = ray.dir.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(qvec) * inv_det;
        Some((t, u, v, det))
    }
}

impl Primitive for Triangle {
    fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        match self.crossing(ray) {
            // det > 0 <=> dir . n < 0: the surface faces the ray
            Some((t, _, _, det)) if det > 0.0 && t > RAY_EPSILON && t < ray.t => {
                ray.t = t;
                ray.hit = self.me.upgrade();
                true
            }
            _ => false,
        }
    }

    fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        match self.crossing(ray) {
            Some((t, _, _, det))
                if det < 0.0 && t > RAY_EPSILON && (ray.hit.is_none() || t > ray.t) =>
            {
                ray.t = t;
                ray.hit = self.me.upgrade();
                true
            }
            _ => false,
        }
    }

    fn bounds(&self) -> Bounds3f {
        Bounds3f::new(self.a, self.b).union_point(self.c)
    }

    fn transform(&mut self, t: &Transform) {
        self.a = t * self.a;
        self.b = t * self.b;
        self.c = t * self.c;
    }

    fn normal(&self, _ray: &Ray) -> Normal3f {
        let n: Vec3f = (self.b - self.a).cross(self.c - self.a).normalized();
        Normal3f::from(n)
    }

    fn texture_coords(&self, ray: &Ray) -> Point2f {
        match self.crossing(ray) {
            Some((_, u, v, _)) => self.ta * (1.0 - u - v) + self.tb * u + self.tc * v,
            None => Point2f::ZERO,
        }
    }

    fn shader(&self) -> Option<Arc<ShaderEnum>> {
        Some(self.shader.clone())
    }
}
