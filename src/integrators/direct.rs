// Copyright @yucwang 2026

use crate::core::bsdf::{ BSDFQueryRecord, BSDF };
use crate::core::error::RenderError;
use crate::core::integrator::Integrator;
use crate::core::interaction::{ Measure, SurfaceIntersection, SurfaceSampleRecord };
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector3f, EPSILON };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use log::warn;
use std::fmt;
use std::str::FromStr;

/// Which estimators of the direct-lighting integral are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    Emitter,
    BSDF,
    MIS,
}

impl FromStr for SamplingStrategy {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emitter" | "ems" => Ok(SamplingStrategy::Emitter),
            "bsdf" | "mats" => Ok(SamplingStrategy::BSDF),
            "mis" => Ok(SamplingStrategy::MIS),
            _ => Err(RenderError::Configuration(format!("unknown sampling strategy '{}'", s))),
        }
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplingStrategy::Emitter => "emitter",
            SamplingStrategy::BSDF => "bsdf",
            SamplingStrategy::MIS => "mis",
        };
        write!(f, "{}", name)
    }
}

fn balance_heuristic(pdf_own: Float, pdf_other: Float) -> Float {
    let sum = pdf_own + pdf_other;
    if sum > 0.0 { pdf_own / sum } else { 0.0 }
}

/// Single-bounce estimator: emitted radiance seen directly plus light
/// reflected once off the first surface hit.
pub struct DirectIntegrator {
    strategy: SamplingStrategy,
}

impl DirectIntegrator {
    pub fn new(strategy: SamplingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Next-event estimate. `wi` is the viewing direction in the shading frame.
    pub fn sample_emitter_term(&self,
                               scene: &Scene,
                               its: &SurfaceIntersection,
                               bsdf: &dyn BSDF,
                               wi: &Vector3f,
                               sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut u = sampler.next_2d();
        let (_, emitter, pick_pdf) = match scene.sample_emitter(&mut u.x) {
            Some(picked) => picked,
            None => return RGBSpectrum::zero(),
        };

        let sample = emitter.sample(scene, its, &u);
        if !sample.is_valid() {
            return RGBSpectrum::zero();
        }
        let pdf_emitter = sample.pdf * pick_pdf;

        let shadow_ray = Ray3f::new(its.p(), sample.wi, Some(EPSILON), Some(sample.distance - EPSILON));
        if scene.ray_intersection_t(&shadow_ray) {
            return RGBSpectrum::zero();
        }

        let record = BSDFQueryRecord::with_directions(*wi, its.to_local(&sample.wi), its.uv());
        let f = bsdf.eval(&record);
        if f.is_black() {
            return RGBSpectrum::zero();
        }
        let cos_theta = Frame::cos_theta(&record.wo).max(0.0);
        let value = sample.radiance * f * (cos_theta / pdf_emitter);

        if self.strategy == SamplingStrategy::MIS && !emitter.is_delta() {
            value * balance_heuristic(pdf_emitter, bsdf.pdf(&record))
        } else {
            value
        }
    }

    /// Estimate from a direction drawn by the BSDF.
    pub fn sample_bsdf_term(&self,
                            scene: &Scene,
                            its: &SurfaceIntersection,
                            bsdf: &dyn BSDF,
                            wi: &Vector3f,
                            sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut record = BSDFQueryRecord::new(*wi, its.uv());
        let weight = bsdf.sample(&mut record, &sampler.next_2d());
        if weight.is_black() {
            return RGBSpectrum::zero();
        }

        let dir = its.to_world(&record.wo);
        let ray = Ray3f::new(its.p(), dir, Some(EPSILON), None);
        let light_its = match scene.ray_intersection(&ray) {
            Some(hit) => hit,
            None => return RGBSpectrum::zero(),
        };
        let (emitter_id, emitter) = match light_its.shape().and_then(|id| scene.shape_emitter(id)) {
            Some(found) => found,
            None => return RGBSpectrum::zero(),
        };

        let light_record = SurfaceSampleRecord::from_intersection(&light_its);
        let le = emitter.eval(&light_record, &-dir);
        if le.is_black() {
            return RGBSpectrum::zero();
        }
        let value = le * weight;

        if self.strategy == SamplingStrategy::MIS && record.measure != Measure::Discrete {
            let pdf_emitter = emitter.pdf(scene, its, &light_record) * scene.emitter_pick_pdf(emitter_id);
            value * balance_heuristic(bsdf.pdf(&record), pdf_emitter)
        } else {
            value
        }
    }
}

impl Integrator for DirectIntegrator {
    fn trace_ray(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let its = match scene.ray_intersection(ray) {
            Some(its) => its,
            None => return scene.background(),
        };
        let shape = match its.shape() {
            Some(shape) => shape,
            None => return RGBSpectrum::zero(),
        };

        // Lights are not lit by other lights.
        if let Some((_, emitter)) = scene.shape_emitter(shape) {
            return emitter.eval(&SurfaceSampleRecord::from_intersection(&its), &-ray.dir());
        }

        let bsdf = match scene.bsdf(shape) {
            Some(bsdf) => bsdf,
            None => return RGBSpectrum::zero(),
        };
        let wi = its.to_local(&-ray.dir());

        let radiance = match self.strategy {
            SamplingStrategy::Emitter => self.sample_emitter_term(scene, &its, bsdf, &wi, sampler),
            SamplingStrategy::BSDF => self.sample_bsdf_term(scene, &its, bsdf, &wi, sampler),
            SamplingStrategy::MIS => {
                self.sample_emitter_term(scene, &its, bsdf, &wi, sampler)
                    + self.sample_bsdf_term(scene, &its, bsdf, &wi, sampler)
            }
        };

        if radiance.has_nan() {
            warn!("Discarding non-finite radiance estimate at ({}, {}, {}).", its.p().x, its.p().y, its.p().z);
            return RGBSpectrum::zero();
        }
        radiance
    }

    fn describe(&self) -> String {
        format!("DirectIntegrator[strategy = {}]", self.strategy)
    }
}
