// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{ Measure, SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;

pub trait Shape: ComputationNode + Send + Sync {
    fn bounding_box(&self) -> AABB;
    fn surface_area(&self) -> Float;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection>;
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool;

    /// Samples a point uniformly with respect to surface area.
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;

    /// Area density of `sample`.
    fn pdf(&self, _sample: &SurfaceSampleRecord) -> Float {
        let area = self.surface_area();
        if area > 0.0 { 1.0 / area } else { 0.0 }
    }

    /// Samples a point as seen from `reference`; the record's pdf is a
    /// solid-angle density.
    fn sample_from_ref(&self, reference: &Vector3f, u: &Vector2f) -> SurfaceSampleRecord {
        let mut sample = self.sample(u);
        sample.pdf = self.pdf_from_ref(reference, &sample);
        sample.measure = Measure::SolidAngle;
        sample
    }

    /// Solid-angle density at `reference` of having sampled `sample`.
    fn pdf_from_ref(&self, reference: &Vector3f, sample: &SurfaceSampleRecord) -> Float {
        solid_angle_pdf_from_area(self.pdf(sample), reference, sample)
    }
}

/// Converts an area density at `sample` into a solid-angle density as seen
/// from `reference`. Degenerate configurations yield zero.
pub fn solid_angle_pdf_from_area(pdf_area: Float, reference: &Vector3f, sample: &SurfaceSampleRecord) -> Float {
    let d = sample.p - reference;
    let dist2 = d.norm_squared();
    if dist2 <= 0.0 {
        return 0.0;
    }
    let cos_theta = (sample.n.dot(&d) / dist2.sqrt()).abs();
    if cos_theta <= 0.0 {
        return 0.0;
    }
    pdf_area * dist2 / cos_theta
}
