// Copyright @yucwang 2026

use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::emitter::{ Emitter, EmitterFlag, EmitterParent, EmitterSample };
use crate::core::error::{ RenderError, Result };
use crate::core::interaction::{ ShapeId, SurfaceIntersection, SurfaceSampleRecord };
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// One-sided diffuse emitter bound to exactly one shape.
pub struct AreaEmitter {
    id: String,
    radiance: RGBSpectrum,
    shape: Option<ShapeId>,
}

impl AreaEmitter {
    pub fn new(radiance: RGBSpectrum) -> Self {
        Self { id: generate_node_id("area"), radiance, shape: None }
    }

    pub fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }
}

impl ComputationNode for AreaEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("AreaEmitter[radiance = ({}, {}, {}), shape = {:?}]",
                self.radiance[0], self.radiance[1], self.radiance[2], self.shape.map(|s| s.0))
    }
}

impl Emitter for AreaEmitter {
    fn flags(&self) -> EmitterFlag {
        EmitterFlag::AREA
    }

    fn set_parent(&mut self, parent: EmitterParent) -> Result<()> {
        match parent {
            EmitterParent::Shape(shape) => match self.shape {
                Some(current) if current == shape => Ok(()),
                Some(_) => Err(RenderError::Configuration(format!(
                    "area emitter '{}' cannot be attached to multiple shapes", self.id))),
                None => {
                    self.shape = Some(shape);
                    Ok(())
                }
            },
            EmitterParent::Scene => Err(RenderError::Configuration(format!(
                "area emitter '{}' can only be attached to a shape", self.id))),
        }
    }

    fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    fn eval(&self, sample: &SurfaceSampleRecord, w: &Vector3f) -> RGBSpectrum {
        if sample.n.dot(w) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::zero()
        }
    }

    fn sample(&self, scene: &Scene, reference: &SurfaceIntersection, u: &Vector2f) -> EmitterSample {
        let shape = match self.shape.and_then(|id| scene.shape(id)) {
            Some(shape) => shape,
            None => return EmitterSample::default(),
        };

        let sample = shape.sample_from_ref(&reference.p(), u);
        let offset = sample.p - reference.p();
        let distance = offset.norm();
        if distance <= 0.0 || sample.pdf <= 0.0 {
            return EmitterSample::default();
        }
        let wi = offset / distance;

        let radiance = if reference.sh_normal().dot(&wi) > 0.0 {
            self.eval(&sample, &-wi)
        } else {
            RGBSpectrum::zero()
        };
        let pdf = shape.pdf_from_ref(&reference.p(), &sample);

        EmitterSample::new(radiance, wi, distance, pdf)
    }

    fn pdf(&self, scene: &Scene, reference: &SurfaceIntersection, sample: &SurfaceSampleRecord) -> Float {
        self.shape
            .and_then(|id| scene.shape(id))
            .map_or(0.0, |shape| shape.pdf_from_ref(&reference.p(), sample))
    }
}
