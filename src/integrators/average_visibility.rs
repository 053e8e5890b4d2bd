// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, EPSILON };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_uniform_hemisphere;

/// Ambient-occlusion style estimate: the fraction of the hemisphere around
/// the shading normal that is unoccluded within `length`.
pub struct AverageVisibilityIntegrator {
    length: Float,
}

impl AverageVisibilityIntegrator {
    pub fn new(length: Float) -> Self {
        Self { length }
    }

    pub fn length(&self) -> Float {
        self.length
    }
}

impl Integrator for AverageVisibilityIntegrator {
    fn trace_ray(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let its = match scene.ray_intersection(ray) {
            Some(its) => its,
            None => return RGBSpectrum::splat(1.0),
        };

        let local = square_to_uniform_hemisphere(&sampler.next_2d());
        let dir = its.sh_frame().to_world(&local);
        let shadow_ray = Ray3f::new(its.p(), dir, Some(EPSILON), Some(self.length));
        if scene.ray_intersection_t(&shadow_ray) {
            RGBSpectrum::zero()
        } else {
            RGBSpectrum::splat(1.0)
        }
    }

    fn describe(&self) -> String {
        format!("AverageVisibilityIntegrator[length = {}]", self.length)
    }
}
