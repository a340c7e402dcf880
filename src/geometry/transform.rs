use std::ops;

use approx::abs_diff_eq;
use overload::overload;

use crate::{
    math::{Matrix4, Normal3f, Point3f, Vec3f},
    Float,
};

use super::bounds3::Bounds3f;

/// Represents a 3D transformation.
///
/// Carries the inverse alongside the matrix so that inverting is free and
/// normals can be transformed by the inverse transpose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transform {
    m: Matrix4,
    m_inv: Matrix4,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m: Matrix4::IDENTITY,
        m_inv: Matrix4::IDENTITY,
    };

    /// Construct a new transform with the given matrix and inverse.
    ///
    /// The given inverse `m_inv` is assumed to be correct.
    pub fn new(m: Matrix4, m_inv: Matrix4) -> Self {
        Self { m, m_inv }
    }

    /// Construct a new transform from the given matrix.
    ///
    /// The inverse is calculated from the matrix.
    pub fn from_matrix(m: Matrix4) -> Self {
        let m_inv = m
            .inverse()
            .expect("Supplied matrix should have an inverse (not singular)");

        Self { m, m_inv }
    }

    /// Construct a transform representing a translation.
    pub fn translate(delta: Vec3f) -> Self {
        let m = Matrix4::new([
            [1.0, 0.0, 0.0, delta.x],
            [0.0, 1.0, 0.0, delta.y],
            [0.0, 0.0, 1.0, delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m_inv = Matrix4::new([
            [1.0, 0.0, 0.0, -delta.x],
            [0.0, 1.0, 0.0, -delta.y],
            [0.0, 0.0, 1.0, -delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        Self { m, m_inv }
    }

    /// Construct a transform representing a rotation about an axis.
    ///
    /// `theta` should be given in degrees.
    pub fn rotate(theta: Float, axis: Vec3f) -> Self {
        let a = axis.normalized();
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
        let m = Matrix4::new([
            [
                a.x * a.x + (1.0 - a.x * a.x) * cos_theta,
                a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta,
                a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta,
                0.0,
            ],
            [
                a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta,
                a.y * a.y + (1.0 - a.y * a.y) * cos_theta,
                a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta,
                0.0,
            ],
            [
                a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta,
                a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta,
                a.z * a.z + (1.0 - a.z * a.z) * cos_theta,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        let m_inv = m.transpose();

        Self { m, m_inv }
    }

    /// Construct a transform representing a rotation about the x axis.
    ///
    /// `theta` should be given in degrees.
    pub fn rotate_x(theta: Float) -> Self {
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
        let m = Matrix4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos_theta, -sin_theta, 0.0],
            [0.0, sin_theta, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        let m_inv = m.transpose();

        Self { m, m_inv }
    }

    /// Construct a transform representing a rotation about the y axis.
    ///
    /// `theta` should be given in degrees.
    pub fn rotate_y(theta: Float) -> Self {
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
        let m = Matrix4::new([
            [cos_theta, 0.0, sin_theta, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin_theta, 0.0, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        let m_inv = m.transpose();

        Self { m, m_inv }
    }

    /// Construct a transform representing a rotation about the z axis.
    ///
    /// `theta` should be given in degrees.
    pub fn rotate_z(theta: Float) -> Self {
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
        let m = Matrix4::new([
            [cos_theta, -sin_theta, 0.0, 0.0],
            [sin_theta, cos_theta, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        let m_inv = m.transpose();

        Self { m, m_inv }
    }

    /// The inverse transform, obtained by swapping the stored matrices.
    pub fn inverse(&self) -> Self {
        Self {
            m: self.m_inv.clone(),
            m_inv: self.m.clone(),
        }
    }

    /// The translation component of the transform.
    pub fn translation(&self) -> Vec3f {
        Vec3f::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Whether the transform is rigid: a rotation block with orthonormal
    /// rows, no reflection, and an affine bottom row. Scale and shear are
    /// rejected.
    pub fn is_rigid(&self) -> bool {
        const EPS: Float = 1e-4;

        let row = |i: usize| Vec3f::new(self.m[i][0], self.m[i][1], self.m[i][2]);
        let (r0, r1, r2) = (row(0), row(1), row(2));

        let orthonormal = abs_diff_eq!(r0.length_squared(), 1.0, epsilon = EPS)
            && abs_diff_eq!(r1.length_squared(), 1.0, epsilon = EPS)
            && abs_diff_eq!(r2.length_squared(), 1.0, epsilon = EPS)
            && abs_diff_eq!(r0.dot(r1), 0.0, epsilon = EPS)
            && abs_diff_eq!(r0.dot(r2), 0.0, epsilon = EPS)
            && abs_diff_eq!(r1.dot(r2), 0.0, epsilon = EPS);
        let no_reflection = r0.cross(r1).dot(r2) > 0.0;
        let affine = self.m[3] == [0.0, 0.0, 0.0, 1.0];

        orthonormal && no_reflection && affine
    }
}

overload!((t: ?Transform) * (p: Point3f) -> Point3f {
    let m = &t.m;

    let x = p.x * m[0][0] + p.y * m[0][1] + p.z * m[0][2] + m[0][3];
    let y = p.x * m[1][0] + p.y * m[1][1] + p.z * m[1][2] + m[1][3];
    let z = p.x * m[2][0] + p.y * m[2][1] + p.z * m[2][2] + m[2][3];
    let w = p.x * m[3][0] + p.y * m[3][1] + p.z * m[3][2] + m[3][3];

    if w == 1.0 {
        Point3f::new(x, y, z)
    } else {
        Point3f::new(x / w, y / w, z / w)
    }
});

overload!((t: ?Transform) * (v: Vec3f) -> Vec3f {
    let m = &t.m;

    Vec3f::new(
        v.x * m[0][0] + v.y * m[0][1] + v.z * m[0][2],
        v.x * m[1][0] + v.y * m[1][1] + v.z * m[1][2],
        v.x * m[2][0] + v.y * m[2][1] + v.z * m[2][2],
    )
});

overload!((t: ?Transform) * (n: Normal3f) -> Normal3f {
    let m_inv = &t.m_inv;

    Normal3f::new(
        n.x * m_inv[0][0] + n.y * m_inv[1][0] + n.z * m_inv[2][0],
        n.x * m_inv[0][1] + n.y * m_inv[1][1] + n.z * m_inv[2][1],
        n.x * m_inv[0][2] + n.y * m_inv[1][2] + n.z * m_inv[2][2],
    )
});

// Apply transform to a bounding box.
overload!((t: ?Transform) * (b: Bounds3f) -> Bounds3f {
    let m = &t.m;

    // The translation column is the transform of the origin; on each axis
    // the extremes of the rotated box are reached by picking, per matrix
    // element, whichever of the original min/max gives the smaller/larger
    // product.
    let translation = Point3f::new(m[0][3], m[1][3], m[2][3]);
    let mut p_min = translation;
    let mut p_max = translation;

    for i in 0..3 {
        for j in 0..3 {
            let lo = m[i][j] * b.p_min[j];
            let hi = m[i][j] * b.p_max[j];
            p_min[i] += lo.min(hi);
            p_max[i] += lo.max(hi);
        }
    }

    Bounds3f { p_min, p_max }
});

overload!((a: ?Transform) * (b: ?Transform) -> Transform {
    Transform::new(&a.m * &b.m, &b.m_inv * &a.m_inv)
});
