// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Debug view of the shading normal at the first hit.
#[derive(Default)]
pub struct NormalIntegrator;

impl NormalIntegrator {
    pub fn new() -> Self {
        Self
    }
}

impl Integrator for NormalIntegrator {
    fn trace_ray(&self, scene: &Scene, ray: &Ray3f, _sampler: &mut dyn Sampler) -> RGBSpectrum {
        match scene.ray_intersection(ray) {
            Some(its) => RGBSpectrum::from_vector(its.sh_normal().abs()),
            None => RGBSpectrum::zero(),
        }
    }

    fn describe(&self) -> String {
        String::from("NormalIntegrator[]")
    }
}
