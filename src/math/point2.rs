use std::ops;

use overload::overload;

use crate::Float;

/// A 2D point, used for texture coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

impl Point2f {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Construct a new point with given elements.
    pub const fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }
}

overload!((a: ?Point2f) + (b: ?Point2f) -> Point2f {
    Point2f::new(a.x + b.x, a.y + b.y)
});
overload!((p: ?Point2f) * (s: Float) -> Point2f {
    Point2f::new(p.x * s, p.y * s)
});
overload!((s: Float) * (p: ?Point2f) -> Point2f {
    Point2f::new(p.x * s, p.y * s)
});
