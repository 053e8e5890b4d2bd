// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::emitter::{ Emitter, EmitterParent };
use crate::core::error::{ RenderError, Result };
use crate::core::interaction::{ EmitterId, ShapeId, SurfaceIntersection };
use crate::core::shape::Shape;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::dpdf::DiscretePDF;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use log::{ debug, info };
use std::sync::Arc;

pub struct SceneObject {
    pub shape: Box<dyn Shape>,
    pub bsdf: Option<Arc<dyn BSDF>>,
    pub emitter: Option<EmitterId>,
}

impl SceneObject {
    pub fn new(shape: Box<dyn Shape>) -> Self {
        Self { shape, bsdf: None, emitter: None }
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }
}

/// Arena owning every shape, BSDF and emitter of a render.
///
/// Shapes and emitters refer to each other through `ShapeId`/`EmitterId`.
/// The scene is assembled with the `add_*`/`attach_*` calls, frozen by
/// `activate`, and read-only afterwards. Rays never hit anything before
/// activation.
pub struct Scene {
    objects: Vec<SceneObject>,
    emitters: Vec<Box<dyn Emitter>>,
    emitter_pdf: DiscretePDF,
    background: RGBSpectrum,
    bvh: Option<BVH>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            emitter_pdf: DiscretePDF::default(),
            background: RGBSpectrum::zero(),
            bvh: None,
        }
    }

    pub fn add_shape(&mut self, shape: Box<dyn Shape>) -> ShapeId {
        self.bvh = None;
        self.objects.push(SceneObject::new(shape));
        ShapeId(self.objects.len() - 1)
    }

    pub fn set_bsdf(&mut self, shape: ShapeId, bsdf: Arc<dyn BSDF>) -> Result<()> {
        let object = self.object_mut(shape)?;
        if object.bsdf.is_some() {
            return Err(RenderError::Configuration(format!(
                "shape '{}' already has a BSDF attached", object.shape.id())));
        }
        object.bsdf = Some(bsdf);
        Ok(())
    }

    /// Registers an emitter without a parent shape (e.g. a point light).
    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) -> EmitterId {
        self.bvh = None;
        self.emitters.push(emitter);
        EmitterId(self.emitters.len() - 1)
    }

    /// Makes `emitter` the emitter of `shape`.
    pub fn attach_emitter(&mut self, shape: ShapeId, emitter: EmitterId) -> Result<()> {
        let shape_name = self.object_mut(shape)?.shape.id().to_string();
        if let Some(existing) = self.objects[shape.0].emitter {
            if existing != emitter {
                return Err(RenderError::Configuration(format!(
                    "shape '{}' already has an emitter attached", shape_name)));
            }
        }

        let target = self.emitters.get_mut(emitter.0).ok_or_else(|| {
            RenderError::Configuration(format!("unknown emitter index {}", emitter.0))
        })?;
        target.set_parent(EmitterParent::Shape(shape))?;
        self.objects[shape.0].emitter = Some(emitter);
        self.bvh = None;
        Ok(())
    }

    /// Adds `shape` lit by `emitter` in one step.
    pub fn add_emissive_shape(&mut self, shape: Box<dyn Shape>, emitter: Box<dyn Emitter>) -> Result<ShapeId> {
        let shape_id = self.add_shape(shape);
        let emitter_id = self.add_emitter(emitter);
        self.attach_emitter(shape_id, emitter_id)?;
        Ok(shape_id)
    }

    pub fn set_background(&mut self, background: RGBSpectrum) {
        self.background = background;
    }

    /// Validates the assembly and builds the acceleration structure and the
    /// emitter selection table.
    pub fn activate(&mut self) -> Result<()> {
        for object in &mut self.objects {
            if object.bsdf.is_none() {
                object.bsdf = Some(Arc::new(LambertianDiffuseBSDF::default()));
            }
        }

        for emitter in &mut self.emitters {
            if emitter.shape().is_none() {
                emitter.set_parent(EmitterParent::Scene)?;
            }
        }

        // Uniform selection weights.
        self.emitter_pdf.clear();
        if !self.emitters.is_empty() {
            self.emitter_pdf.reserve(self.emitters.len());
            for _ in &self.emitters {
                self.emitter_pdf.append(1.0)?;
            }
            self.emitter_pdf.normalize()?;
        }

        let prim_bounds: Vec<AABB> = self.objects.iter().map(|o| o.shape.bounding_box()).collect();
        let bvh = BVH::from_bounds(prim_bounds);
        let bounds = bvh.bounds();
        self.bvh = Some(bvh);

        info!("Scene activated: {} shapes, {} emitters.", self.objects.len(), self.emitters.len());
        if !self.objects.is_empty() {
            debug!("  bounds: ({}, {}, {}) - ({}, {}, {})",
                   bounds.p_min.x, bounds.p_min.y, bounds.p_min.z,
                   bounds.p_max.x, bounds.p_max.y, bounds.p_max.z);
        }
        for object in &self.objects {
            debug!("  {}", object.shape.to_string());
        }
        for emitter in &self.emitters {
            debug!("  {}", emitter.to_string());
        }

        Ok(())
    }

    pub fn is_activated(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let bvh = self.bvh.as_ref()?;
        bvh.ray_intersection(ray, |prim_idx, ray| {
            self.objects[prim_idx].shape.ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })
        .map(|(idx, hit)| hit.with_shape(ShapeId(idx)))
    }

    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        match self.bvh.as_ref() {
            Some(bvh) => bvh.ray_intersection_t(ray, |prim_idx, ray| {
                self.objects[prim_idx].shape.ray_intersection_t(ray)
            }),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn shape(&self, id: ShapeId) -> Option<&dyn Shape> {
        self.objects.get(id.0).map(|o| o.shape.as_ref())
    }

    pub fn bsdf(&self, id: ShapeId) -> Option<&dyn BSDF> {
        self.objects.get(id.0).and_then(|o| o.bsdf.as_deref())
    }

    /// Emitter attached to shape `id`, if the shape is emissive.
    pub fn shape_emitter(&self, id: ShapeId) -> Option<(EmitterId, &dyn Emitter)> {
        let emitter_id = self.objects.get(id.0)?.emitter?;
        self.emitter(emitter_id).map(|e| (emitter_id, e))
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&dyn Emitter> {
        self.emitters.get(id.0).map(|e| e.as_ref())
    }

    pub fn emitters(&self) -> &[Box<dyn Emitter>] {
        &self.emitters
    }

    pub fn emitter_pdf(&self) -> &DiscretePDF {
        &self.emitter_pdf
    }

    /// Picks an emitter from the selection table, rescaling `u` for reuse.
    /// Returns the emitter and the probability it was picked with.
    pub fn sample_emitter(&self, u: &mut Float) -> Option<(EmitterId, &dyn Emitter, Float)> {
        let (index, pick_pdf) = self.emitter_pdf.sample_reuse(u).ok()?;
        self.emitter(EmitterId(index)).map(|e| (EmitterId(index), e, pick_pdf))
    }

    /// Probability that emitter `id` is picked by `sample_emitter`.
    pub fn emitter_pick_pdf(&self, id: EmitterId) -> Float {
        self.emitter_pdf.pdf(id.0)
    }

    pub fn has_emitters(&self) -> bool {
        self.emitter_pdf.is_normalized()
    }

    pub fn background(&self) -> RGBSpectrum {
        self.background
    }

    fn object_mut(&mut self, id: ShapeId) -> Result<&mut SceneObject> {
        self.objects.get_mut(id.0).ok_or_else(|| {
            RenderError::Configuration(format!("unknown shape index {}", id.0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::area::AreaEmitter;
    use crate::emitters::point::PointEmitter;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::Vector3f;
    use crate::shapes::sphere::Sphere;

    fn unit_ray(z: Float) -> Ray3f {
        Ray3f::new(Vector3f::new(0.0, 0.0, z), Vector3f::new(0.0, 0.0, -1.0), None, None)
    }

    #[test]
    fn test_closest_hit_and_shape_ids() {
        let mut scene = Scene::new();
        let far = scene.add_shape(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, -10.0), 1.0)));
        let near = scene.add_shape(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, -3.0), 1.0)));
        assert_ne!(far, near);

        assert!(!scene.is_activated());
        assert!(scene.ray_intersection(&unit_ray(0.0)).is_none());

        scene.activate().unwrap();
        let hit = scene.ray_intersection(&unit_ray(0.0)).expect("expected a hit");
        assert_eq!(hit.shape(), Some(near));
        assert!((hit.t() - 2.0).abs() < 1e-4);
        assert!(scene.ray_intersection_t(&unit_ray(0.0)));

        // Default material is assigned on activation.
        assert!(scene.bsdf(far).is_some());
    }

    #[test]
    fn test_emitter_attachment_rules() {
        let mut scene = Scene::new();
        let a = scene.add_shape(Box::new(Sphere::new(Vector3f::zeros(), 1.0)));
        let b = scene.add_shape(Box::new(Sphere::new(Vector3f::new(3.0, 0.0, 0.0), 1.0)));
        let light = scene.add_emitter(Box::new(AreaEmitter::new(RGBSpectrum::splat(1.0))));

        scene.attach_emitter(a, light).unwrap();
        assert!(scene.attach_emitter(b, light).is_err());
        assert_eq!(scene.shape_emitter(a).map(|(id, _)| id), Some(light));
        assert!(scene.shape_emitter(b).is_none());

        let other = scene.add_emitter(Box::new(AreaEmitter::new(RGBSpectrum::splat(1.0))));
        assert!(scene.attach_emitter(a, other).is_err());
    }

    #[test]
    fn test_unattached_area_emitter_fails_activation() {
        let mut scene = Scene::new();
        scene.add_shape(Box::new(Sphere::new(Vector3f::zeros(), 1.0)));
        scene.add_emitter(Box::new(AreaEmitter::new(RGBSpectrum::splat(1.0))));
        assert!(matches!(scene.activate(), Err(RenderError::Configuration(_))));
    }

    #[test]
    fn test_emitter_selection_is_uniform() {
        let mut scene = Scene::new();
        scene.add_emitter(Box::new(PointEmitter::new(Vector3f::zeros(), RGBSpectrum::splat(1.0))));
        scene.add_emissive_shape(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0)),
                                 Box::new(AreaEmitter::new(RGBSpectrum::splat(2.0)))).unwrap();
        assert!(!scene.has_emitters());
        scene.activate().unwrap();
        assert!(scene.has_emitters());

        assert!((scene.emitter_pick_pdf(EmitterId(0)) - 0.5).abs() < 1e-6);
        let mut u = 0.75;
        let (id, _, pdf) = scene.sample_emitter(&mut u).unwrap();
        assert_eq!(id, EmitterId(1));
        assert!((pdf - 0.5).abs() < 1e-6);
        assert!((u - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_single_bsdf_per_shape() {
        let mut scene = Scene::new();
        let id = scene.add_shape(Box::new(Sphere::new(Vector3f::zeros(), 1.0)));
        scene.set_bsdf(id, Arc::new(LambertianDiffuseBSDF::default())).unwrap();
        assert!(scene.set_bsdf(id, Arc::new(LambertianDiffuseBSDF::default())).is_err());
        assert!(scene.set_bsdf(ShapeId(7), Arc::new(LambertianDiffuseBSDF::default())).is_err());
    }
}
