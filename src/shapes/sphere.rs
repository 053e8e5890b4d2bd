// Copyright @yucwang 2026

use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::interaction::{ Measure, SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::{ solid_angle_pdf_from_area, Shape };
use crate::math::aabb::AABB;
use crate::math::constants::{ safe_sqrt, Float, Vector2f, Vector3f, INV_PI, INV_TWOPI, PI };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::warp::{ spherical_cap_one_minus_cos, square_to_uniform_sphere, square_to_uniform_spherical_cap_sin2 };

pub struct Sphere {
    id: String,
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { id: generate_node_id("sphere"), center, radius }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    // Nearest root of |o + t d - c|^2 = r^2 inside the ray segment. The
    // discriminant is taken from the perpendicular offset so that it stays
    // exact for small spheres seen from far away.
    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let b = oc.dot(&d);
        let perp = oc - b * d;
        let discriminant = self.radius * self.radius - perp.norm_squared();
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t0 = -b - root;
        let t1 = -b + root;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }

    fn spherical_uv(&self, n: &Vector3f) -> Vector2f {
        let phi = n.y.atan2(n.x);
        let phi = if phi < 0.0 { phi + 2.0 * PI } else { phi };
        let theta = n.z.max(-1.0).min(1.0).acos();
        Vector2f::new(phi * INV_TWOPI, theta * INV_PI)
    }

    /// Squared sine of the half-angle subtended by the sphere at `reference`.
    /// Values above one mean the reference lies inside.
    fn sin_theta_max2(&self, reference: &Vector3f) -> Float {
        let dist2 = (self.center - reference).norm_squared();
        if dist2 <= 0.0 {
            return Float::MAX;
        }
        self.radius * self.radius / dist2
    }
}

impl ComputationNode for Sphere {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Sphere[center = ({}, {}, {}), radius = {}]",
                self.center.x, self.center.y, self.center.z, self.radius)
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.hit_distance(ray)?;
        let p = ray.at(t);
        let n = (p - self.center) / self.radius;
        let uv = self.spherical_uv(&n);
        Some(SurfaceIntersection::new(p, t, uv, n, n))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = square_to_uniform_sphere(u);
        let p = self.center + self.radius * n;
        SurfaceSampleRecord::new(p, n, self.spherical_uv(&n), 1.0 / self.surface_area(), Measure::Area)
    }

    /// Samples the cone of directions towards the visible cap.
    fn sample_from_ref(&self, reference: &Vector3f, u: &Vector2f) -> SurfaceSampleRecord {
        let sin_theta_max2 = self.sin_theta_max2(reference);
        if sin_theta_max2 > 1.0 {
            let mut sample = self.sample(u);
            sample.pdf = solid_angle_pdf_from_area(sample.pdf, reference, &sample);
            sample.measure = Measure::SolidAngle;
            return sample;
        }

        let to_center = self.center - reference;
        let cone = Frame::from_normal(to_center.normalize());
        let local = square_to_uniform_spherical_cap_sin2(u, sin_theta_max2);

        // Angle at the centre between the axis and the visible hit point.
        let sin2_theta = local.x * local.x + local.y * local.y;
        let cos_theta = local.z;
        let cos_alpha = sin2_theta / sin_theta_max2.sqrt()
            + cos_theta * safe_sqrt(1.0 - sin2_theta / sin_theta_max2);
        let sin_alpha = safe_sqrt(1.0 - cos_alpha * cos_alpha);
        let sin_theta = sin2_theta.sqrt();
        let azimuth = if sin_theta > 0.0 { sin_alpha / sin_theta } else { 0.0 };

        let n = cone.to_world(&Vector3f::new(local.x * azimuth, local.y * azimuth, -cos_alpha)).normalize();
        let p = self.center + self.radius * n;

        SurfaceSampleRecord::new(p, n, self.spherical_uv(&n),
                                 INV_TWOPI / spherical_cap_one_minus_cos(sin_theta_max2),
                                 Measure::SolidAngle)
    }

    fn pdf_from_ref(&self, reference: &Vector3f, sample: &SurfaceSampleRecord) -> Float {
        let sin_theta_max2 = self.sin_theta_max2(reference);
        if sin_theta_max2 > 1.0 {
            return solid_angle_pdf_from_area(self.pdf(sample), reference, sample);
        }
        INV_TWOPI / spherical_cap_one_minus_cos(sin_theta_max2)
    }
}
