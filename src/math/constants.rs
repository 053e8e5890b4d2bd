/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_TWOPI: Float = 0.15915494309;
pub const INV_FOURPI: Float = 0.07957747154;
pub const SQUARE_2: Float = 1.41421356;
pub const INV_SQUARE_2: Float = 0.70710678;

pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;

// Largest float strictly below one.
pub const ONE_MINUS_EPSILON: Float = 0.99999994;

/// Square root that clamps slightly negative round-off to zero.
#[inline]
pub fn safe_sqrt(v: Float) -> Float {
    v.max(0.0).sqrt()
}
