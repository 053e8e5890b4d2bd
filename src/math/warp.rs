// Copyright @yucwang 2023

//! Mappings from the unit square to sampling domains, each paired with the
//! density of the points it produces.

use super::constants::{ safe_sqrt, Float, Vector2f, Vector3f, INV_FOURPI, INV_PI, INV_TWOPI, PI };
use crate::core::error::RenderError;

use std::fmt;
use std::str::FromStr;

pub fn square_to_uniform_square(u: &Vector2f) -> Vector2f {
    *u
}

pub fn square_to_uniform_square_pdf(p: &Vector2f) -> Float {
    if p.x >= 0.0 && p.x <= 1.0 && p.y >= 0.0 && p.y <= 1.0 {
        1.0
    } else {
        0.0
    }
}

fn tent_inverse(u: Float) -> Float {
    if u < 0.5 {
        safe_sqrt(2.0 * u) - 1.0
    } else {
        1.0 - safe_sqrt(2.0 - 2.0 * u)
    }
}

pub fn square_to_tent(u: &Vector2f) -> Vector2f {
    Vector2f::new(tent_inverse(u.x), tent_inverse(u.y))
}

pub fn square_to_tent_pdf(p: &Vector2f) -> Float {
    if p.x.abs() > 1.0 || p.y.abs() > 1.0 {
        return 0.0;
    }
    (1.0 - p.x.abs()) * (1.0 - p.y.abs())
}

pub fn square_to_uniform_disk(u: &Vector2f) -> Vector2f {
    let r = safe_sqrt(u.x);
    let theta = 2.0 * PI * u.y;
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vector2f::new(r * cos_theta, r * sin_theta)
}

pub fn square_to_uniform_disk_pdf(p: &Vector2f) -> Float {
    if p.norm_squared() <= 1.0 {
        INV_PI
    } else {
        0.0
    }
}

/// Returns the barycentric weights of the second and third vertex.
pub fn square_to_uniform_triangle(u: &Vector2f) -> Vector2f {
    let t = safe_sqrt(u.x);
    Vector2f::new(1.0 - t, t * u.y)
}

pub fn square_to_uniform_triangle_pdf(p: &Vector2f) -> Float {
    if p.x >= 0.0 && p.y >= 0.0 && p.x + p.y < 1.0 {
        2.0
    } else {
        0.0
    }
}

fn spherical_direction(cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

pub fn square_to_uniform_sphere(u: &Vector2f) -> Vector3f {
    spherical_direction(1.0 - 2.0 * u.x, 2.0 * PI * u.y)
}

pub fn square_to_uniform_sphere_pdf(_v: &Vector3f) -> Float {
    INV_FOURPI
}

pub fn square_to_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    spherical_direction(u.x, 2.0 * PI * u.y)
}

pub fn square_to_uniform_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z > 0.0 {
        INV_TWOPI
    } else {
        0.0
    }
}

// Malley's method: lift a uniform disk sample onto the hemisphere.
pub fn square_to_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = square_to_uniform_disk(u);
    let z = safe_sqrt(1.0 - p.x * p.x - p.y * p.y);

    Vector3f::new(p.x, p.y, z)
}

pub fn square_to_cosine_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z > 0.0 {
        v.z * INV_PI
    } else {
        0.0
    }
}

/// Uniform direction inside the cone of half-angle `acos(cos_theta_max)` around +z.
pub fn square_to_uniform_spherical_cap(u: &Vector2f, cos_theta_max: Float) -> Vector3f {
    cap_direction(u, 1.0 - cos_theta_max)
}

/// Same cone, given by the squared sine of its half-angle. Stays accurate
/// for cones too narrow for `1 - cos_theta_max` to be represented.
pub fn square_to_uniform_spherical_cap_sin2(u: &Vector2f, sin2_theta_max: Float) -> Vector3f {
    cap_direction(u, spherical_cap_one_minus_cos(sin2_theta_max))
}

/// `1 - cos(theta_max)` from `sin^2(theta_max)` without cancellation.
pub fn spherical_cap_one_minus_cos(sin2_theta_max: Float) -> Float {
    sin2_theta_max / (1.0 + safe_sqrt(1.0 - sin2_theta_max))
}

fn cap_direction(u: &Vector2f, one_minus_cos_theta_max: Float) -> Vector3f {
    let one_minus_cos = u.x * one_minus_cos_theta_max;
    // sin^2 = (1 - cos)(1 + cos)
    let sin_theta = safe_sqrt(one_minus_cos * (2.0 - one_minus_cos));
    let (sin_phi, cos_phi) = (2.0 * PI * u.y).sin_cos();
    Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, 1.0 - one_minus_cos)
}

pub fn square_to_uniform_spherical_cap_pdf(v: &Vector3f, cos_theta_max: Float) -> Float {
    if v.z > cos_theta_max {
        INV_TWOPI / (1.0 - cos_theta_max)
    } else {
        0.0
    }
}

/// Samples a microfacet normal proportionally to `D(m) cos(theta_m)`.
pub fn square_to_beckmann(u: &Vector2f, alpha: Float) -> Vector3f {
    let tan_theta2 = -alpha * alpha * (1.0 - u.x).ln();
    let cos_theta = 1.0 / safe_sqrt(1.0 + tan_theta2);
    spherical_direction(cos_theta, 2.0 * PI * u.y)
}

pub fn square_to_beckmann_pdf(m: &Vector3f, alpha: Float) -> Float {
    if m.z <= 0.0 {
        return 0.0;
    }
    beckmann_d(m, alpha) * m.z
}

/// Beckmann normal distribution `D(m)` for a local-frame microfacet normal.
pub fn beckmann_d(m: &Vector3f, alpha: Float) -> Float {
    if m.z <= 0.0 {
        return 0.0;
    }
    let inv_cos2 = 1.0 / (m.z * m.z);
    let inv_alpha2 = 1.0 / (alpha * alpha);
    INV_PI * inv_alpha2 * inv_cos2 * inv_cos2 * (inv_alpha2 * (1.0 - inv_cos2)).exp()
}

/// Closed set of warps, addressable by name.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WarpType {
    UniformSquare,
    Tent,
    UniformDisk,
    UniformTriangle,
    UniformSphere,
    UniformHemisphere,
    CosineHemisphere,
    UniformSphericalCap { cos_theta_max: Float },
    Beckmann { alpha: Float },
}

impl WarpType {
    pub fn sample(&self, u: &Vector2f) -> Vector3f {
        match *self {
            WarpType::UniformSquare => lift(square_to_uniform_square(u)),
            WarpType::Tent => lift(square_to_tent(u)),
            WarpType::UniformDisk => lift(square_to_uniform_disk(u)),
            WarpType::UniformTriangle => lift(square_to_uniform_triangle(u)),
            WarpType::UniformSphere => square_to_uniform_sphere(u),
            WarpType::UniformHemisphere => square_to_uniform_hemisphere(u),
            WarpType::CosineHemisphere => square_to_cosine_hemisphere(u),
            WarpType::UniformSphericalCap { cos_theta_max } => {
                square_to_uniform_spherical_cap(u, cos_theta_max)
            }
            WarpType::Beckmann { alpha } => square_to_beckmann(u, alpha),
        }
    }

    pub fn pdf(&self, p: &Vector3f) -> Float {
        let p2 = Vector2f::new(p.x, p.y);
        match *self {
            WarpType::UniformSquare => square_to_uniform_square_pdf(&p2),
            WarpType::Tent => square_to_tent_pdf(&p2),
            WarpType::UniformDisk => square_to_uniform_disk_pdf(&p2),
            WarpType::UniformTriangle => square_to_uniform_triangle_pdf(&p2),
            WarpType::UniformSphere => square_to_uniform_sphere_pdf(p),
            WarpType::UniformHemisphere => square_to_uniform_hemisphere_pdf(p),
            WarpType::CosineHemisphere => square_to_cosine_hemisphere_pdf(p),
            WarpType::UniformSphericalCap { cos_theta_max } => {
                square_to_uniform_spherical_cap_pdf(p, cos_theta_max)
            }
            WarpType::Beckmann { alpha } => square_to_beckmann_pdf(p, alpha),
        }
    }

    /// Measure of the support: area for planar warps, solid angle otherwise.
    pub fn support_measure(&self) -> Float {
        match *self {
            WarpType::UniformSquare => 1.0,
            WarpType::Tent => 4.0,
            WarpType::UniformDisk => PI,
            WarpType::UniformTriangle => 0.5,
            WarpType::UniformSphere => 4.0 * PI,
            WarpType::UniformHemisphere | WarpType::CosineHemisphere | WarpType::Beckmann { .. } => 2.0 * PI,
            WarpType::UniformSphericalCap { cos_theta_max } => 2.0 * PI * (1.0 - cos_theta_max),
        }
    }
}

fn lift(p: Vector2f) -> Vector3f {
    Vector3f::new(p.x, p.y, 0.0)
}

impl FromStr for WarpType {
    type Err = RenderError;

    /// Parametrised warps take their defaults (`cos_theta_max = 0.5`, `alpha = 0.1`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "square" => Ok(WarpType::UniformSquare),
            "tent" => Ok(WarpType::Tent),
            "disk" => Ok(WarpType::UniformDisk),
            "triangle" => Ok(WarpType::UniformTriangle),
            "sphere" => Ok(WarpType::UniformSphere),
            "hemisphere" => Ok(WarpType::UniformHemisphere),
            "cosine_hemisphere" => Ok(WarpType::CosineHemisphere),
            "spherical_cap" => Ok(WarpType::UniformSphericalCap { cos_theta_max: 0.5 }),
            "beckmann" => Ok(WarpType::Beckmann { alpha: 0.1 }),
            other => Err(RenderError::Configuration(format!("unknown warp type '{}'", other))),
        }
    }
}

impl fmt::Display for WarpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarpType::UniformSquare => write!(f, "square"),
            WarpType::Tent => write!(f, "tent"),
            WarpType::UniformDisk => write!(f, "disk"),
            WarpType::UniformTriangle => write!(f, "triangle"),
            WarpType::UniformSphere => write!(f, "sphere"),
            WarpType::UniformHemisphere => write!(f, "hemisphere"),
            WarpType::CosineHemisphere => write!(f, "cosine_hemisphere"),
            WarpType::UniformSphericalCap { cos_theta_max } => {
                write!(f, "spherical_cap(cos_theta_max = {})", cos_theta_max)
            }
            WarpType::Beckmann { alpha } => write!(f, "beckmann(alpha = {})", alpha),
        }
    }
}
