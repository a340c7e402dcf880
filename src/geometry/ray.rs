use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    math::{Point3f, Vec3f},
    primitives::PrimRef,
    Float,
};

/// A ray query carrying its running result.
///
/// `t` holds the parametric distance of the best accepted crossing so far
/// and `hit` references the primitive responsible for it; `hit` is `Some`
/// exactly when a crossing has been accepted. For nearest queries `t`
/// starts at infinity and only shrinks; for furthest queries `t` is
/// meaningful only once `hit` is set, and only grows.
#[derive(Clone, Debug)]
pub struct Ray {
    /// Origin of the ray.
    pub o: Point3f,
    /// Direction of the ray. Must be unit length.
    pub dir: Vec3f,
    /// Parametric distance of the accepted crossing, if any.
    pub t: Float,
    /// The primitive responsible for the accepted crossing.
    pub hit: Option<PrimRef>,
    /// Opaque per-ray identifier consumed by accelerator mailboxes.
    ///
    /// Must be unique per ray; [`Ray::new`] and [`Ray::probe`] draw from a
    /// process-wide ticket, and callers constructing rays by hand are
    /// responsible for doing the same.
    pub counter: u32,
}

static COUNTER_TICKET: AtomicU32 = AtomicU32::new(1);

impl Ray {
    /// Construct a new ray with no result and a fresh counter.
    pub fn new(o: Point3f, dir: Vec3f) -> Self {
        Self {
            o,
            dir,
            t: Float::INFINITY,
            hit: None,
            counter: Self::next_counter(),
        }
    }

    /// Draw a counter value from the process-wide ticket.
    pub fn next_counter() -> u32 {
        COUNTER_TICKET.fetch_add(1, Ordering::Relaxed)
    }

    /// A fresh query along the same line: same origin and direction, no
    /// result, new counter. Used by composites to probe their children
    /// without disturbing the caller's ray.
    pub fn probe(&self) -> Self {
        Self::new(self.o, self.dir)
    }

    /// The point along the ray at parametric distance `t`.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.dir * t
    }

    /// The point of the accepted crossing.
    pub fn hit_point(&self) -> Point3f {
        self.at(self.t)
    }
}
