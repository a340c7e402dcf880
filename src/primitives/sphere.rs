use std::sync::{Arc, RwLock, Weak};

use crate::{
    float::{PI, RAY_EPSILON},
    geometry::{Bounds3f, Ray, Transform},
    math::{quadratic, Normal3f, Point2f, Point3f, Vec3f},
    shading::ShaderEnum,
    Float,
};

use super::{PrimRef, Primitive, PrimitiveEnum};

/// An analytic sphere.
#[derive(Debug)]
pub struct Sphere {
    shader: Arc<ShaderEnum>,
    center: Point3f,
    radius: Float,
    me: Weak<RwLock<PrimitiveEnum>>,
}

impl Sphere {
    pub fn build(shader: Arc<ShaderEnum>, center: Point3f, radius: Float) -> PrimRef {
        assert!(radius > 0.0, "sphere radius must be positive");

        Arc::new_cyclic(|me| {
            RwLock::new(PrimitiveEnum::Sphere(Self {
                shader,
                center,
                radius,
                me: me.clone(),
            }))
        })
    }

    /// Both crossings of the ray with the sphere surface, ordered.
    fn roots(&self, ray: &Ray) -> Option<(Float, Float)> {
        let oc = ray.o - self.center;
        let a = ray.dir.length_squared();
        let b = 2.0 * oc.dot(ray.dir);
        let c = oc.length_squared() - self.radius * self.radius;

        quadratic(a, b, c)
    }
}

impl Primitive for Sphere {
    fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        // The smaller root is the entry; a ray starting inside has only an
        // exit ahead and reports no entry.
        match self.roots(ray) {
            Some((t0, _)) if t0 > RAY_EPSILON && t0 < ray.t => {
                ray.t = t0;
                ray.hit = self.me.upgrade();
                true
            }
            _ => false,
        }
    }

    fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        match self.roots(ray) {
            Some((_, t1)) if t1 > RAY_EPSILON && (ray.hit.is_none() || t1 > ray.t) => {
                ray.t = t1;
                ray.hit = self.me.upgrade();
                true
            }
            _ => false,
        }
    }

    fn bounds(&self) -> Bounds3f {
        let r = Vec3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn transform(&mut self, t: &Transform) {
        self.center = t * self.center;
    }

    fn normal(&self, ray: &Ray) -> Normal3f {
        Normal3f::from((ray.hit_point() - self.center) / self.radius).normalized()
    }

    fn texture_coords(&self, ray: &Ray) -> Point2f {
        let p = (ray.hit_point() - self.center) / self.radius;
        let theta = p.z.clamp(-1.0, 1.0).acos();
        let mut phi = p.y.atan2(p.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }

        Point2f::new(phi / (2.0 * PI), theta / PI)
    }

    fn shader(&self) -> Option<Arc<ShaderEnum>> {
        Some(self.shader.clone())
    }
}
