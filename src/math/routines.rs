use num_traits::Float as FloatTrait;

use crate::{float::MACHINE_EPSILON, Float};

/// Linearly interpolate between `a` and `b`.
///
/// Extrapolates for `t < 0` or `t > 1`.
pub fn lerp<T: FloatTrait>(a: T, b: T, t: T) -> T {
    (T::one() - t) * a + t * b
}

/// Conservative floating-point error bound for `n` accumulated operations.
pub fn gamma(n: i32) -> Float {
    let n = n as Float;
    (n * MACHINE_EPSILON) / (1.0 - n * MACHINE_EPSILON)
}

/// Solve `a*t^2 + b*t + c = 0`, returning the roots as `(t0, t1)` with
/// `t0 <= t1`, or `None` if there is no real solution.
///
/// Uses the numerically stable variant of the quadratic formula to avoid
/// catastrophic cancellation in the smaller root.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        let t = -c / b;
        return Some((t, t));
    }

    let discrim = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        return None;
    }
    let discrim_sqrt = discrim.sqrt();

    let q = if b < 0.0 {
        -0.5 * (b - discrim_sqrt)
    } else {
        -0.5 * (b + discrim_sqrt)
    };
    let t0 = q / a;
    let t1 = c / q;

    if t0 <= t1 {
        Some((t0, t1))
    } else {
        Some((t1, t0))
    }
}
