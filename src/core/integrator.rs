// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Estimates the radiance arriving along a camera ray.
///
/// Implementations only read the scene; all randomness comes from the
/// sampler owned by the caller, so distinct rays can run on distinct threads.
pub trait Integrator: Send + Sync {
    fn trace_ray(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum;

    fn describe(&self) -> String;
}
