//! Owning containers of primitives.
//!
//! A solid groups primitives that share a shader and a pivot point. Its
//! primitives stay shared-owned: handing a solid to a composite clones the
//! handles, not the geometry, so transforming the composite later moves
//! the primitives as seen by every holder.

use std::sync::Arc;

use delegate::delegate;
use thiserror::Error;

use crate::{
    geometry::{Bounds3f, Transform},
    math::{Point2f, Point3f, Vec3f},
    primitives::{PrimRef, Primitive, Triangle},
    shading::ShaderEnum,
};

mod cuboid;
mod cylinder;
mod quad;
mod sphere;

/// Errors from the tessellating constructors.
#[derive(Debug, Error)]
pub enum SolidError {
    #[error("invalid tessellation parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Default)]
pub struct Solid {
    prims: Vec<PrimRef>,
    pivot: Point3f,
}

impl Solid {
    /// An empty solid pivoted at `pivot`.
    pub fn new(pivot: Point3f) -> Self {
        Self {
            prims: Vec::new(),
            pivot,
        }
    }

    /// Adapt an existing primitive (typically a composite) into a
    /// single-member solid so it can serve as a child of another
    /// composite. The pivot starts at the primitive's bounds center.
    pub fn from_primitive(prim: PrimRef) -> Self {
        let pivot = prim.read().unwrap().bounds().centroid();
        Self {
            prims: vec![prim],
            pivot,
        }
    }

    pub fn push(&mut self, prim: PrimRef) {
        self.prims.push(prim);
    }

    pub fn primitives(&self) -> &[PrimRef] {
        &self.prims
    }

    pub fn pivot(&self) -> Point3f {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: Point3f) {
        self.pivot = pivot;
    }

    delegate! {
        to self.prims {
            /// Number of member primitives.
            pub fn len(&self) -> usize;
            /// Whether the solid has no primitives.
            pub fn is_empty(&self) -> bool;
        }
    }

    /// Bounds of all member primitives.
    pub fn bounds(&self) -> Bounds3f {
        self.prims
            .iter()
            .map(|prim| prim.read().unwrap().bounds())
            .fold(Bounds3f::EMPTY, Bounds3f::union)
    }

    /// Apply a rigid transform pivoted about the solid's pivot point.
    ///
    /// Not concurrent-safe with intersection; transforms belong to the
    /// scene-edit phase.
    pub fn transform(&mut self, t: &Transform) {
        assert!(
            t.is_rigid(),
            "solid transforms must be rigid (rotation and translation only)"
        );

        let pivoted = Transform::translate(Vec3f::from(self.pivot))
            * t
            * Transform::translate(-Vec3f::from(self.pivot));
        for prim in &self.prims {
            prim.write().unwrap().transform(&pivoted);
        }
        self.pivot = self.pivot + t.translation();
    }

    /// Append a quad as two triangles. Corners are counter-clockwise as
    /// seen from the outside.
    fn push_quad(
        &mut self,
        shader: &Arc<ShaderEnum>,
        corners: [Point3f; 4],
        coords: [Point2f; 4],
    ) {
        let [a, b, c, d] = corners;
        let [ta, tb, tc, td] = coords;
        self.push(Triangle::build_with_coords(shader.clone(), a, b, c, ta, tb, tc));
        self.push(Triangle::build_with_coords(shader.clone(), a, c, d, ta, tc, td));
    }
}
