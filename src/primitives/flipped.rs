use std::sync::{Arc, RwLock};

use crate::{
    geometry::{Bounds3f, Ray, Transform},
    math::{Normal3f, Point2f},
    shading::ShaderEnum,
};

use super::{PrimRef, Primitive, PrimitiveEnum};

/// A shim substituted for a hit primitive when its geometric normal faces
/// the wrong way for the composite surface it ended up on, most notably
/// B's exit surface on a Difference, which becomes an outer boundary of
/// A - B.
///
/// Carries the child's shader and texture coordinates with the reversed
/// normal, and lives only inside a returned `ray.hit`. It is not part of
/// any solid, so intersecting or transforming one is a caller bug.
#[derive(Debug)]
pub struct FlippedSurface {
    shader: Option<Arc<ShaderEnum>>,
    n: Normal3f,
    uv: Point2f,
}

impl FlippedSurface {
    /// Replace the hit carried by `ray` with a proxy whose normal is the
    /// reverse of the child's. Returns `None` when the ray holds no hit.
    pub fn wrap(ray: &Ray) -> Option<PrimRef> {
        let (shader, n, uv) = {
            let prim = ray.hit.as_ref()?.read().unwrap();
            (prim.shader(), -prim.normal(ray), prim.texture_coords(ray))
        };

        Some(Arc::new(RwLock::new(PrimitiveEnum::Flipped(Self {
            shader,
            n,
            uv,
        }))))
    }
}

impl Primitive for FlippedSurface {
    fn intersect_nearest(&self, _ray: &mut Ray) -> bool {
        unreachable!("flipped-surface proxies exist only as returned hits")
    }

    fn intersect_furthest(&self, _ray: &mut Ray) -> bool {
        unreachable!("flipped-surface proxies exist only as returned hits")
    }

    fn bounds(&self) -> Bounds3f {
        unreachable!("flipped-surface proxies exist only as returned hits")
    }

    fn transform(&mut self, _t: &Transform) {
        unreachable!("flipped-surface proxies exist only as returned hits")
    }

    fn normal(&self, _ray: &Ray) -> Normal3f {
        self.n
    }

    fn texture_coords(&self, _ray: &Ray) -> Point2f {
        self.uv
    }

    fn shader(&self) -> Option<Arc<ShaderEnum>> {
        self.shader.clone()
    }
}
