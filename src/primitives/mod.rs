use std::sync::{Arc, RwLock};

use enum_dispatch::enum_dispatch;

use crate::{
    geometry::{Bounds3f, Ray, Transform},
    math::{Normal3f, Point2f},
    shading::ShaderEnum,
};

mod composite;
mod flipped;
mod sphere;
mod triangle;

pub use composite::{BoolOp, Composite, CompositeBuilder, CompositeBuilderError};
pub use flipped::FlippedSurface;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Shared handle to a primitive.
///
/// Solids, composites and rays all reference primitives through this
/// handle; a primitive lives as long as its longest-lived holder. The lock
/// exists for the scene-edit phase (rigid transforms); during rendering
/// primitives are immutable and every path takes read locks only.
pub type PrimRef = Arc<RwLock<PrimitiveEnum>>;

#[enum_dispatch]
#[derive(Debug)]
pub enum PrimitiveEnum {
    Triangle(Triangle),
    Sphere(Sphere),
    Composite(Composite),
    Flipped(FlippedSurface),
}

/// The intersectable contract.
///
/// Nearest queries report the closest *entry* crossing (one whose surface
/// faces the ray); furthest queries report the farthest *exit* crossing.
/// Both mutate only the documented `t`/`hit` fields, and only on success:
/// a nearest hit must beat the incoming `ray.t`, a furthest hit must
/// exceed it (or be the first).
#[enum_dispatch(PrimitiveEnum)]
pub trait Primitive {
    /// Test for the nearest entry crossing. On success updates `ray.t` and
    /// `ray.hit` and returns `true`; otherwise leaves the ray unchanged.
    fn intersect_nearest(&self, ray: &mut Ray) -> bool;

    /// Test for the furthest exit crossing, symmetric to
    /// [`intersect_nearest`](Primitive::intersect_nearest).
    fn intersect_furthest(&self, ray: &mut Ray) -> bool;

    /// Axis-aligned bounds of the primitive.
    fn bounds(&self) -> Bounds3f;

    /// Apply a rigid transform in place.
    fn transform(&mut self, t: &Transform);

    /// Outward geometric normal at the ray's accepted crossing.
    fn normal(&self, ray: &Ray) -> Normal3f;

    /// Texture coordinates at the ray's accepted crossing.
    fn texture_coords(&self, ray: &Ray) -> Point2f;

    /// The shader bound to this primitive, if any.
    fn shader(&self) -> Option<Arc<ShaderEnum>>;
}
