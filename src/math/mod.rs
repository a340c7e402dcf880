mod matrix4;
mod normal3;
mod point2;
mod point3;
mod routines;
mod vec3;

pub use matrix4::Matrix4;
pub use normal3::Normal3f;
pub use point2::Point2f;
pub use point3::Point3f;
pub use routines::{gamma, lerp, quadratic};
pub use vec3::Vec3f;
