//! A minimal shader surface.
//!
//! Shading proper is outside the core; the contract exists so that a hit's
//! material travels with it through composites, including through the
//! normal-flipping proxy substituted on Difference surfaces.

use enum_dispatch::enum_dispatch;

use crate::{
    geometry::Ray,
    math::Vec3f,
    primitives::Primitive,
};

#[enum_dispatch]
#[derive(Debug)]
pub enum ShaderEnum {
    Eyelight(EyelightShader),
    Flat(FlatShader),
}

#[enum_dispatch(ShaderEnum)]
pub trait Shader {
    /// The RGB color of the surface for the given finished ray.
    fn shade(&self, ray: &Ray) -> Vec3f;
}

/// Shades by the angle between the ray and the surface normal, which reads
/// as if a light were mounted at the eye.
#[derive(Debug)]
pub struct EyelightShader {
    color: Vec3f,
}

impl EyelightShader {
    pub fn new(color: Vec3f) -> Self {
        Self { color }
    }
}

impl Shader for EyelightShader {
    fn shade(&self, ray: &Ray) -> Vec3f {
        match &ray.hit {
            Some(prim) => {
                let n = prim.read().unwrap().normal(ray);
                self.color * n.dot_v(ray.dir).abs()
            }
            None => Vec3f::ZERO,
        }
    }
}

/// Constant-color shader.
#[derive(Debug)]
pub struct FlatShader {
    color: Vec3f,
}

impl FlatShader {
    pub fn new(color: Vec3f) -> Self {
        Self { color }
    }
}

impl Shader for FlatShader {
    fn shade(&self, _ray: &Ray) -> Vec3f {
        self.color
    }
}
