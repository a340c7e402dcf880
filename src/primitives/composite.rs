use std::collections::HashSet;
use std::sync::Arc;

use derive_builder::Builder;
use log::trace;

use crate::{
    accel::{AccelMode, Accelerator},
    float::HIT_EPSILON,
    geometry::{Bounds3f, Ray, Transform},
    math::{Normal3f, Point2f, Point3f, Vec3f},
    shading::ShaderEnum,
    solids::Solid,
    Float,
};

use super::{FlippedSurface, PrimRef, Primitive};

/// The Boolean operator of a composite node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    Union,
    Intersection,
    Difference,
}

/// A CSG node: two child primitive lists combined under a Boolean
/// operator, indistinguishable from a leaf primitive to its callers.
///
/// The child lists are shared with the solids they came from; the
/// accelerators over them are owned exclusively. A composite is immutable
/// during rendering, so many threads may intersect it concurrently;
/// [`transform`](Primitive::transform) belongs to the scene-edit phase and
/// requires external synchronization against in-flight queries.
#[derive(Debug)]
pub struct Composite {
    prims_a: Vec<PrimRef>,
    prims_b: Vec<PrimRef>,
    accel_a: Accelerator,
    accel_b: Accelerator,
    op: BoolOp,
    bounds: Bounds3f,
    origin: Point3f,
    accel_mode: AccelMode,
    max_depth: usize,
    min_prims: usize,
}

#[derive(Builder)]
#[builder(
    name = "CompositeBuilder",
    public,
    build_fn(private, name = "build_params")
)]
struct CompositeParams<'a> {
    solid_a: &'a Solid,
    solid_b: &'a Solid,
    op: BoolOp,
    #[builder(default = "AccelMode::default()")]
    accel_mode: AccelMode,
    #[builder(default = "20")]
    max_depth: usize,
    #[builder(default = "3")]
    min_prims: usize,
}

impl<'a> CompositeBuilder<'a> {
    pub fn build(&self) -> Result<Composite, CompositeBuilderError> {
        let params = self.build_params()?;

        if params.solid_a.is_empty() || params.solid_b.is_empty() {
            return Err(CompositeBuilderError::ValidationError(
                "composite children must have at least one primitive each".into(),
            ));
        }
        if params.max_depth == 0 || params.min_prims == 0 {
            return Err(CompositeBuilderError::ValidationError(format!(
                "accelerator limits must be positive (max_depth {}, min_prims {})",
                params.max_depth, params.min_prims
            )));
        }

        let prims_a = params.solid_a.primitives().to_vec();
        let prims_b = params.solid_b.primitives().to_vec();
        let accel_a =
            Accelerator::build(&prims_a, params.accel_mode, params.max_depth, params.min_prims);
        let accel_b =
            Accelerator::build(&prims_b, params.accel_mode, params.max_depth, params.min_prims);

        let bounds = operator_bounds(params.op, accel_a.bounds(), accel_b.bounds());
        // Disjoint Intersection operands leave an inverted box; keep the
        // pivot finite regardless.
        let origin = if bounds.is_empty() {
            accel_a.bounds().union(accel_b.bounds()).centroid()
        } else {
            bounds.centroid()
        };

        Ok(Composite {
            prims_a,
            prims_b,
            accel_a,
            accel_b,
            op: params.op,
            bounds,
            origin,
            accel_mode: params.accel_mode,
            max_depth: params.max_depth,
            min_prims: params.min_prims,
        })
    }
}

impl Composite {
    pub fn builder<'a>() -> CompositeBuilder<'a> {
        CompositeBuilder::create_empty()
    }

    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// The pivot rigid transforms compose about. Set to the bounds center
    /// at construction and carried along by translations afterwards.
    pub fn origin(&self) -> Point3f {
        self.origin
    }

    /// Wrap the composite into a shared primitive handle so it can join a
    /// solid or another composite.
    pub fn into_prim(self) -> PrimRef {
        Arc::new(std::sync::RwLock::new(super::PrimitiveEnum::Composite(self)))
    }

    fn probe_side(accel: &Accelerator, ray: &Ray) -> (Ray, Ray) {
        let mut near = ray.probe();
        accel.intersect_nearest(&mut near);
        let mut far = ray.probe();
        accel.intersect_furthest(&mut far);

        (near, far)
    }

    fn rebuild(&mut self) {
        self.accel_a = Accelerator::build(
            &self.prims_a,
            self.accel_mode,
            self.max_depth,
            self.min_prims,
        );
        self.accel_b = Accelerator::build(
            &self.prims_b,
            self.accel_mode,
            self.max_depth,
            self.min_prims,
        );
        self.bounds = operator_bounds(self.op, self.accel_a.bounds(), self.accel_b.bounds());
        trace!(
            "rebuilt {:?} composite over {}+{} primitives",
            self.op,
            self.prims_a.len(),
            self.prims_b.len()
        );
    }
}

impl Primitive for Composite {
    fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        if self.bounds.is_empty() || self.bounds.intersect_p(ray, ray.t).is_none() {
            return false;
        }

        let (na, fa) = Self::probe_side(&self.accel_a, ray);
        let (nb, fb) = Self::probe_side(&self.accel_b, ray);
        if na.hit.is_none() && fa.hit.is_none() && nb.hit.is_none() && fb.hit.is_none() {
            return false;
        }

        let res = match self.op {
            BoolOp::Union => union_nearest(na, fa, nb, fb),
            BoolOp::Intersection => intersection_nearest(na, fa, nb, fb),
            BoolOp::Difference => difference_nearest(na, fa, nb, fb),
        };

        match res {
            // Occlusion gate: the caller may already hold a closer hit.
            Some(mut res) if res.t < ray.t => {
                face_toward_ray(&mut res);
                ray.t = res.t;
                ray.hit = res.hit;
                true
            }
            _ => false,
        }
    }

    fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        if self.bounds.is_empty() {
            return false;
        }
        match self.bounds.intersect_p(ray, Float::INFINITY) {
            None => return false,
            Some((_, t1)) if ray.hit.is_some() && t1 <= ray.t => return false,
            Some(_) => {}
        }

        let (na, fa) = Self::probe_side(&self.accel_a, ray);
        let (nb, fb) = Self::probe_side(&self.accel_b, ray);
        if na.hit.is_none() && fa.hit.is_none() && nb.hit.is_none() && fb.hit.is_none() {
            return false;
        }

        let res = match self.op {
            BoolOp::Union => union_furthest(na, fa, nb, fb),
            BoolOp::Intersection => intersection_furthest(na, fa, nb, fb),
            BoolOp::Difference => difference_furthest(na, fa, nb, fb),
        };

        match res {
            // Gate in reverse: only ever push the caller's hit outwards.
            Some(mut res) if ray.hit.is_none() || res.t > ray.t => {
                face_along_ray(&mut res);
                ray.t = res.t;
                ray.hit = res.hit;
                true
            }
            _ => false,
        }
    }

    fn bounds(&self) -> Bounds3f {
        self.bounds
    }

    /// Apply a rigid transform pivoted about the composite's origin, then
    /// rebuild both accelerators and the operator bounds.
    ///
    /// Child primitives shared between both lists (or with outside
    /// holders) move exactly once.
    fn transform(&mut self, t: &Transform) {
        assert!(
            t.is_rigid(),
            "composite transforms must be rigid (rotation and translation only)"
        );

        let pivoted = Transform::translate(Vec3f::from(self.origin))
            * t
            * Transform::translate(-Vec3f::from(self.origin));

        let mut moved = HashSet::new();
        for prim in self.prims_a.iter().chain(self.prims_b.iter()) {
            if moved.insert(Arc::as_ptr(prim) as usize) {
                prim.write().unwrap().transform(&pivoted);
            }
        }

        self.origin = self.origin + t.translation();
        self.rebuild();
    }

    fn normal(&self, _ray: &Ray) -> Normal3f {
        unreachable!("composite normals come from the hit child primitive")
    }

    fn texture_coords(&self, _ray: &Ray) -> Point2f {
        unreachable!("composite texture coordinates come from the hit child primitive")
    }

    fn shader(&self) -> Option<Arc<ShaderEnum>> {
        None
    }
}

fn operator_bounds(op: BoolOp, a: Bounds3f, b: Bounds3f) -> Bounds3f {
    match op {
        BoolOp::Union => a.union(b),
        BoolOp::Intersection => a.intersect(b),
        BoolOp::Difference => a,
    }
}

fn hit(r: &Ray) -> bool {
    r.hit.is_some()
}

fn closer(a: Ray, b: Ray) -> Ray {
    if a.t <= b.t {
        a
    } else {
        b
    }
}

fn farther(a: Ray, b: Ray) -> Ray {
    if a.t >= b.t {
        a
    } else {
        b
    }
}

/// Furthest of whichever results are present.
fn farthest_hit(a: Ray, b: Ray) -> Option<Ray> {
    match (hit(&a), hit(&b)) {
        (true, true) => Some(farther(a, b)),
        (true, false) => Some(a),
        (false, true) => Some(b),
        (false, false) => None,
    }
}

/// First surface belonging to either interior.
fn union_nearest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    match (hit(&na), hit(&nb)) {
        // Both entered ahead: the earlier entry is the union surface.
        (true, true) => Some(closer(na, nb)),
        (true, false) => {
            if !hit(&fb) {
                Some(na)
            } else if fb.t < na.t {
                // The origin is inside B and B ends before A begins:
                // leaving B is leaving the union.
                Some(fb)
            } else {
                // A begins while still inside B; the spans are contiguous
                // and the union ends at the later exit.
                farthest_hit(fa, fb)
            }
        }
        (false, true) => {
            if !hit(&fa) {
                Some(nb)
            } else if fa.t < nb.t {
                Some(fa)
            } else {
                farthest_hit(fa, fb)
            }
        }
        // No entries ahead: the origin is inside whatever was hit, and the
        // union surface is the last exit.
        (false, false) => farthest_hit(fa, fb),
    }
}

/// First surface inside both solids.
fn intersection_nearest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    match (hit(&na), hit(&nb)) {
        // The overlap begins at the later entry, valid only while still
        // inside the other solid.
        (true, true) => {
            if na.t < nb.t {
                (hit(&fa) && nb.t < fa.t).then_some(nb)
            } else {
                (hit(&fb) && na.t < fb.t).then_some(na)
            }
        }
        // Origin inside B: A's entry counts while B lasts.
        (true, false) => (hit(&fb) && na.t < fb.t).then_some(na),
        (false, true) => (hit(&fa) && nb.t < fa.t).then_some(nb),
        // Origin inside both: the first boundary out of the overlap is the
        // inner exit.
        (false, false) => (hit(&fa) && hit(&fb)).then(|| closer(fa, fb)),
    }
}

/// Surfaces of A not inside B, plus B's exits where they carve A.
fn difference_nearest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    if !hit(&na) && !hit(&fa) {
        return None;
    }
    // B contributes no volume on this ray; A's surface stands.
    if !hit(&fb) {
        return if hit(&na) { Some(na) } else { Some(fa) };
    }

    match (hit(&na), hit(&nb)) {
        (true, true) => {
            if na.t + HIT_EPSILON < nb.t {
                // A is entered before B starts; the entry is not carved.
                Some(na)
            } else if fb.t <= na.t + HIT_EPSILON {
                // B grazes at or ends before A's entry.
                Some(na)
            } else if hit(&fa) && fb.t + HIT_EPSILON < fa.t {
                // The ray enters A inside B; the first visible surface is
                // B's exit, which bounds the carved region.
                Some(fb)
            } else {
                // B swallows A's span on this ray.
                None
            }
        }
        (true, false) => {
            // Origin inside B with A ahead.
            if fb.t <= na.t + HIT_EPSILON {
                Some(na)
            } else if hit(&fa) && fb.t + HIT_EPSILON < fa.t {
                Some(fb)
            } else {
                None
            }
        }
        (false, true) => {
            // Origin inside A only: the ray starts inside the difference
            // and leaves it at whichever boundary comes first.
            if nb.t < fa.t {
                Some(nb)
            } else {
                Some(fa)
            }
        }
        (false, false) => {
            // Origin inside both: leaving B while still inside A re-enters
            // the difference.
            if fb.t + HIT_EPSILON < fa.t {
                Some(fb)
            } else {
                None
            }
        }
    }
}

/// Last exit of either interior.
fn union_furthest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    // Fall back to entries only for zero-volume grazes.
    farthest_hit(fa, fb).or_else(|| farthest_hit(na, nb))
}

/// The inner exit of the overlap.
fn intersection_furthest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    let entry_a = if hit(&na) { na.t } else { 0.0 };
    let entry_b = if hit(&nb) { nb.t } else { 0.0 };
    let entry = entry_a.max(entry_b);

    // A side with no crossings at all contributes no overlap; a graze
    // without an exit bounds the overlap at the graze itself.
    let exit_a = if hit(&fa) { fa } else { na };
    let exit_b = if hit(&fb) { fb } else { nb };
    if !hit(&exit_a) || !hit(&exit_b) {
        return None;
    }

    let exit = closer(exit_a, exit_b);
    (exit.t >= entry).then_some(exit)
}

/// Far boundary of the A - B interval.
fn difference_furthest(na: Ray, fa: Ray, nb: Ray, fb: Ray) -> Option<Ray> {
    if !hit(&na) && !hit(&fa) {
        return None;
    }
    // Without B volume the difference ends where A does.
    if !hit(&fb) {
        return if hit(&fa) { Some(fa) } else { Some(na) };
    }

    let exit_a = if hit(&fa) { fa } else { na.clone() };
    let entry_b = if hit(&nb) { nb.t } else { 0.0 };

    if exit_a.t < entry_b || exit_a.t > fb.t {
        // A's exit lies outside B and survives the subtraction.
        Some(exit_a)
    } else {
        // A's exit is swallowed by B; the difference ends where B begins,
        // provided that happens inside A.
        let entry_a = if hit(&na) { na.t } else { 0.0 };
        (hit(&nb) && nb.t > entry_a + HIT_EPSILON).then_some(nb)
    }
}

/// Nearest-hit orientation contract: the returned surface faces the ray.
fn face_toward_ray(res: &mut Ray) {
    flip_if(res, |cos| cos > 0.0)
}

/// Furthest-hit orientation contract: the returned surface faces along
/// the ray.
fn face_along_ray(res: &mut Ray) {
    flip_if(res, |cos| cos < 0.0)
}

fn flip_if(res: &mut Ray, wrong_way: impl Fn(Float) -> bool) {
    let Some(prim) = res.hit.clone() else {
        return;
    };
    let cos = prim.read().unwrap().normal(res).dot_v(res.dir);
    if wrong_way(cos) {
        res.hit = FlippedSurface::wrap(res);
    }
}
