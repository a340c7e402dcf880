use crate::{
    math::{gamma, Point3f, Vec3f},
    Float,
};

use super::ray::Ray;

/// A 3D axis-aligned bounding box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Bounds3f {
    /// An empty box: extents are inverted so that any union with it yields
    /// the other operand.
    pub const EMPTY: Self = Self {
        p_min: Point3f::new(Float::INFINITY, Float::INFINITY, Float::INFINITY),
        p_max: Point3f::new(
            Float::NEG_INFINITY,
            Float::NEG_INFINITY,
            Float::NEG_INFINITY,
        ),
    };

    /// Construct a new bounding box with two corner points.
    ///
    /// The min and max points are determined by the component-wise mins and
    /// maxes of the given points.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(p2),
            p_max: p1.max(p2),
        }
    }

    /// Construct a new bounding box that consists of a single point.
    pub fn new_with_point(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Construct the union of `self` and `other`.
    ///
    /// Note that this new box doesn't necessarily consist of the exact same
    /// space as the two combined.
    pub fn union(self, other: Self) -> Self {
        Self {
            p_min: self.p_min.min(other.p_min),
            p_max: self.p_max.max(other.p_max),
        }
    }

    /// Construct the minimum bounding box that contains `self` as well as a
    /// point `p`.
    pub fn union_point(self, p: Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Construct a bounding box consisting of the intersection of `self` and
    /// `other`. May be empty.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            p_min: self.p_min.max(other.p_min),
            p_max: self.p_max.min(other.p_max),
        }
    }

    /// Returns `true` if the extents are inverted on any axis, meaning the
    /// box contains no point.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Obtain the vector from the min to the max point of `self`.
    pub fn diagonal(&self) -> Vec3f {
        self.p_max - self.p_min
    }

    /// The center point of the box.
    pub fn centroid(&self) -> Point3f {
        self.p_min + self.diagonal() * 0.5
    }

    /// Determines the axis that `self` is widest on, and returns its index.
    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Returns the coordinates of one of the eight corners of `self`.
    ///
    /// 0 returns `p_min`, 7 returns `p_max`.
    pub fn corner(&self, corner: usize) -> Point3f {
        Point3f::new(
            if corner & 1 != 0 {
                self.p_max.x
            } else {
                self.p_min.x
            },
            if corner & 2 != 0 {
                self.p_max.y
            } else {
                self.p_min.y
            },
            if corner & 4 != 0 {
                self.p_max.z
            } else {
                self.p_min.z
            },
        )
    }

    /// Checks for a ray-box intersection within `[0, t_max]` and returns the
    /// two parametric `t` values of the overlap, if any, as `(lower, higher)`.
    #[inline]
    pub fn intersect_p(&self, ray: &Ray, t_max: Float) -> Option<(Float, Float)> {
        let (mut t0, mut t1) = (0.0, t_max);
        for i in 0..3 {
            // Update interval for ith bounding box slab
            let inv_ray_dir = 1.0 / ray.dir[i];

            let t_min_plane = (self.p_min[i] - ray.o[i]) * inv_ray_dir;
            let t_max_plane = (self.p_max[i] - ray.o[i]) * inv_ray_dir;

            let t_near = t_min_plane.min(t_max_plane);
            let mut t_far = t_min_plane.max(t_max_plane);

            t_far *= 1.0 + 2.0 * gamma(3);

            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };

            if t0 > t1 {
                return None;
            }
        }

        Some((t0, t1))
    }
}
