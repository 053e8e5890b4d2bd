// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::error::Result;
use crate::core::interaction::{ ShapeId, SurfaceIntersection, SurfaceSampleRecord };
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EmitterFlag: u8 {
        const DELTA_POSITION = 1 << 0;
        const DELTA_DIRECTION = 1 << 1;
        const AREA = 1 << 2;
        const INFINITE = 1 << 3;
    }
}

/// What an emitter is being attached to while a scene is assembled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmitterParent {
    Shape(ShapeId),
    Scene,
}

/// Result of sampling an emitter from a reference point.
///
/// `wi` points from the reference towards the emitter and `pdf` is a
/// solid-angle density (1 for delta emitters).
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterSample {
    pub radiance: RGBSpectrum,
    pub wi: Vector3f,
    pub distance: Float,
    pub pdf: Float,
}

impl Default for EmitterSample {
    fn default() -> Self {
        Self {
            radiance: RGBSpectrum::zero(),
            wi: Vector3f::zeros(),
            distance: 0.0,
            pdf: 0.0,
        }
    }
}

impl EmitterSample {
    pub fn new(radiance: RGBSpectrum, wi: Vector3f, distance: Float, pdf: Float) -> Self {
        Self { radiance, wi, distance, pdf }
    }

    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && !self.radiance.is_black()
    }
}

pub trait Emitter: ComputationNode + Send + Sync {
    fn flags(&self) -> EmitterFlag;

    fn is_delta(&self) -> bool {
        self.flags().intersects(EmitterFlag::DELTA_POSITION | EmitterFlag::DELTA_DIRECTION)
    }

    fn set_parent(&mut self, parent: EmitterParent) -> Result<()>;

    /// Shape this emitter is attached to, if any.
    fn shape(&self) -> Option<ShapeId> {
        None
    }

    /// Radiance leaving `sample` towards `w`.
    fn eval(&self, sample: &SurfaceSampleRecord, w: &Vector3f) -> RGBSpectrum;

    fn sample(&self, scene: &Scene, reference: &SurfaceIntersection, u: &Vector2f) -> EmitterSample;

    /// Solid-angle density at `reference` of sampling `sample`.
    fn pdf(&self, scene: &Scene, reference: &SurfaceIntersection, sample: &SurfaceSampleRecord) -> Float;
}
