// Copyright @yucwang 2026

use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::emitter::{ Emitter, EmitterFlag, EmitterParent, EmitterSample };
use crate::core::error::{ RenderError, Result };
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector2f, Vector3f, INV_FOURPI };
use crate::math::spectrum::RGBSpectrum;

/// Isotropic point light described by its total radiant power.
pub struct PointEmitter {
    id: String,
    position: Vector3f,
    power: RGBSpectrum,
}

impl PointEmitter {
    pub fn new(position: Vector3f, power: RGBSpectrum) -> Self {
        Self { id: generate_node_id("point"), position, power }
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }
}

impl Default for PointEmitter {
    fn default() -> Self {
        Self::new(Vector3f::zeros(), RGBSpectrum::splat(15.0))
    }
}

impl ComputationNode for PointEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PointEmitter[position = ({}, {}, {}), power = ({}, {}, {})]",
                self.position.x, self.position.y, self.position.z,
                self.power[0], self.power[1], self.power[2])
    }
}

impl Emitter for PointEmitter {
    fn flags(&self) -> EmitterFlag {
        EmitterFlag::DELTA_POSITION
    }

    fn set_parent(&mut self, parent: EmitterParent) -> Result<()> {
        match parent {
            EmitterParent::Scene => Ok(()),
            EmitterParent::Shape(_) => Err(RenderError::Configuration(format!(
                "point emitter '{}' cannot be attached to a shape", self.id))),
        }
    }

    // No surface to look at.
    fn eval(&self, _sample: &SurfaceSampleRecord, _w: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::zero()
    }

    /// Exact direction with a unit pdf; the radiance already carries the
    /// inverse-square falloff.
    fn sample(&self, _scene: &Scene, reference: &SurfaceIntersection, _u: &Vector2f) -> EmitterSample {
        let offset = self.position - reference.p();
        let distance = offset.norm();
        if distance <= 0.0 {
            return EmitterSample::default();
        }
        let radiance = self.power * (INV_FOURPI / (distance * distance));
        EmitterSample::new(radiance, offset / distance, distance, 1.0)
    }

    fn pdf(&self, _scene: &Scene, _reference: &SurfaceIntersection, _sample: &SurfaceSampleRecord) -> Float {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::PointEmitter;
    use crate::core::emitter::{ Emitter, EmitterParent };
    use crate::core::interaction::{ ShapeId, SurfaceIntersection };
    use crate::core::scene::Scene;
    use crate::math::constants::{ Vector2f, Vector3f, PI };
    use crate::math::spectrum::RGBSpectrum;
    use approx::assert_relative_eq;

    fn reference_at(z: f32) -> SurfaceIntersection {
        let up = Vector3f::new(0.0, 0.0, 1.0);
        SurfaceIntersection::new(Vector3f::new(0.0, 0.0, z), 1.0, Vector2f::zeros(), up, up)
    }

    #[test]
    fn test_inverse_square_law() {
        let scene = Scene::new();
        let light = PointEmitter::new(Vector3f::new(0.0, 0.0, 4.0), RGBSpectrum::splat(8.0 * PI));
        assert!(light.is_delta());

        let near = light.sample(&scene, &reference_at(2.0), &Vector2f::new(0.1, 0.9));
        let far = light.sample(&scene, &reference_at(0.0), &Vector2f::new(0.7, 0.2));
        assert_eq!(near.pdf, 1.0);
        assert_eq!(far.pdf, 1.0);
        assert_relative_eq!(near.distance, 2.0, epsilon = 1e-6);
        assert_relative_eq!(far.distance, 4.0, epsilon = 1e-6);
        assert_relative_eq!(near.radiance[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(far.radiance[0], near.radiance[0] / 4.0, epsilon = 1e-6);
        assert_relative_eq!(far.wi.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_point_emitter_parent() {
        let mut light = PointEmitter::default();
        assert!(light.set_parent(EmitterParent::Scene).is_ok());
        assert!(light.set_parent(EmitterParent::Shape(ShapeId(0))).is_err());
        assert!(light.shape().is_none());
    }
}
