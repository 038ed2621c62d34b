use std::f64::consts::PI as WIDE_PI;

use cgmath::{InnerSpace as _, Matrix4, Vector2, Vector3};

pub type Float = f64;
pub type Vec2 = Vector2<Float>;
pub type Vec3 = Vector3<Float>;
pub type Mat4 = Matrix4<Float>;
pub type Resolution = Vector2<usize>;

pub const PI: Float = WIDE_PI as Float;
pub const EPSILON: Float = Float::EPSILON * 512.0;

/// Normalizes `v`, leaving a zero vector untouched instead of producing NaNs.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.magnitude();
    if length > EPSILON { v / length } else { v }
}
