//! Per-solid ray acceleration.
//!
//! A composite owns one accelerator per child primitive list. The strategy
//! is picked at construction: the BSP tree for real scenes, or the linear
//! reference scan the BSP path is validated against.

use crate::{
    geometry::{Bounds3f, Ray},
    primitives::{PrimRef, Primitive},
};

mod bsp;

pub use bsp::BspTree;

/// Acceleration strategy for a composite's child lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccelMode {
    /// Spatial BSP tree.
    #[default]
    Bsp,
    /// Test every primitive, no spatial structure.
    Scan,
}

#[derive(Debug)]
pub enum Accelerator {
    Bsp(BspTree),
    Scan(LinearScan),
}

impl Accelerator {
    /// Build an index over `prims`. `max_depth` and `min_prims` only apply
    /// to the BSP strategy.
    ///
    /// Building over an empty list is a contract violation.
    pub fn build(prims: &[PrimRef], mode: AccelMode, max_depth: usize, min_prims: usize) -> Self {
        match mode {
            AccelMode::Bsp => Self::Bsp(BspTree::build(prims.to_vec(), max_depth, min_prims)),
            AccelMode::Scan => Self::Scan(LinearScan::new(prims.to_vec())),
        }
    }

    /// Bounds of all indexed primitives.
    pub fn bounds(&self) -> Bounds3f {
        match self {
            Self::Bsp(tree) => tree.bounds(),
            Self::Scan(scan) => scan.bounds(),
        }
    }

    /// Nearest entry crossing over all indexed primitives.
    pub fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        match self {
            Self::Bsp(tree) => tree.intersect_nearest(ray),
            Self::Scan(scan) => scan.intersect_nearest(ray),
        }
    }

    /// Furthest exit crossing over all indexed primitives.
    pub fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        match self {
            Self::Bsp(tree) => tree.intersect_furthest(ray),
            Self::Scan(scan) => scan.intersect_furthest(ray),
        }
    }
}

/// The reference path: every primitive is tested against every ray, the
/// ray itself accumulating the best crossing.
#[derive(Debug)]
pub struct LinearScan {
    prims: Vec<PrimRef>,
    bounds: Bounds3f,
}

impl LinearScan {
    pub fn new(prims: Vec<PrimRef>) -> Self {
        assert!(
            !prims.is_empty(),
            "acceleration structures require at least one primitive"
        );

        let bounds = prims
            .iter()
            .map(|prim| prim.read().unwrap().bounds())
            .fold(Bounds3f::EMPTY, Bounds3f::union);

        Self { prims, bounds }
    }

    pub fn bounds(&self) -> Bounds3f {
        self.bounds
    }

    pub fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        let mut any = false;
        for prim in &self.prims {
            any |= prim.read().unwrap().intersect_nearest(ray);
        }

        any
    }

    pub fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        let mut any = false;
        for prim in &self.prims {
            any |= prim.read().unwrap().intersect_furthest(ray);
        }

        any
    }
}
