// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::Measure;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes
pub type BSDFValue = RGBSpectrum;

/// Directions are in the local shading frame. `wi` points towards the
/// viewer, `wo` towards the light (or the sampled direction).
#[derive(Debug, Clone, PartialEq)]
pub struct BSDFQueryRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub uv: Vector2f,
    pub measure: Measure,
}

impl Default for BSDFQueryRecord {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            wo: Vector3f::zeros(),
            uv: Vector2f::zeros(),
            measure: Measure::Unknown,
        }
    }
}

impl BSDFQueryRecord {
    /// Query awaiting a sampled `wo`.
    pub fn new(wi: Vector3f, uv: Vector2f) -> Self {
        Self { wi, uv, ..Self::default() }
    }

    pub fn with_directions(wi: Vector3f, wo: Vector3f, uv: Vector2f) -> Self {
        Self { wi, wo, uv, measure: Measure::SolidAngle }
    }
}

pub trait BSDF: ComputationNode + Send + Sync {
    fn eval(&self, record: &BSDFQueryRecord) -> BSDFValue;

    /// Solid-angle density of `sample` producing `record.wo`.
    fn pdf(&self, record: &BSDFQueryRecord) -> Float;

    /// Fills in `record.wo` and returns `eval * cos(theta_o) / pdf`.
    /// A zero value signals a failed sample.
    fn sample(&self, record: &mut BSDFQueryRecord, u: &Vector2f) -> BSDFValue;

    fn is_diffuse(&self) -> bool {
        false
    }
}
