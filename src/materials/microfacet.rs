// Copyright @yucwang 2026

use crate::core::bsdf::{ BSDFQueryRecord, BSDFValue, BSDF };
use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::interaction::Measure;
use crate::math::constants::{ Float, Vector2f, Vector3f, INV_PI, ONE_MINUS_EPSILON };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ beckmann_d, square_to_beckmann, square_to_beckmann_pdf, square_to_cosine_hemisphere };

/// Mirror `wi` about the microfacet normal `m`.
pub fn reflect(wi: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wi.dot(m) * m - wi
}

/// Unpolarized Fresnel reflectance of a dielectric interface.
/// A negative `cos_i` means the ray arrives from the interior side.
pub fn fresnel_dielectric(cos_i: Float, ext_ior: Float, int_ior: Float) -> Float {
    if ext_ior == int_ior {
        return 0.0;
    }
    let cos_i = cos_i.max(-1.0).min(1.0);
    let (eta_i, eta_t, cos_i) = if cos_i < 0.0 {
        (int_ior, ext_ior, -cos_i)
    } else {
        (ext_ior, int_ior, cos_i)
    };

    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_s = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    let r_p = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    0.5 * (r_s * r_s + r_p * r_p)
}

/// One-sided Smith shadowing-masking term for the Beckmann distribution,
/// using the rational fit.
pub fn smith_g1_beckmann(v: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    let tan_theta = Frame::tan_theta(v).abs();
    if tan_theta == 0.0 {
        return 1.0;
    }
    if m.dot(v) * Frame::cos_theta(v) <= 0.0 {
        return 0.0;
    }
    let a = 1.0 / (alpha * tan_theta);
    if a >= 1.6 {
        return 1.0;
    }
    let a2 = a * a;
    (3.535 * a + 2.181 * a2) / (1.0 + 2.276 * a + 2.577 * a2)
}

/// Rough dielectric coating (Beckmann) over a Lambertian base.
///
/// The specular lobe is weighted by `ks = 1 - max(kd)`. This keeps the sum
/// below one for gray albedos but is not energy-exact in general.
pub struct MicrofacetBSDF {
    id: String,
    alpha: Float,
    int_ior: Float,
    ext_ior: Float,
    kd: RGBSpectrum,
    ks: Float,
}

impl MicrofacetBSDF {
    pub fn new(alpha: Float, int_ior: Float, ext_ior: Float, kd: RGBSpectrum) -> Self {
        let ks = 1.0 - kd.max_component();
        Self { id: generate_node_id("microfacet"), alpha, int_ior, ext_ior, kd, ks }
    }

    pub fn alpha(&self) -> Float {
        self.alpha
    }

    pub fn ks(&self) -> Float {
        self.ks
    }

    fn specular(&self, wi: &Vector3f, wo: &Vector3f, m: &Vector3f) -> Float {
        let d = beckmann_d(m, self.alpha);
        let g = smith_g1_beckmann(wi, m, self.alpha) * smith_g1_beckmann(wo, m, self.alpha);
        let f = fresnel_dielectric(Frame::cos_theta(wi), self.ext_ior, self.int_ior);
        self.ks * f * g * d / (4.0 * Frame::cos_theta(wi) * Frame::cos_theta(wo))
    }
}

impl Default for MicrofacetBSDF {
    fn default() -> Self {
        // BK7 glass over a mid-gray base, seen from air.
        Self::new(0.1, 1.5046, 1.000277, RGBSpectrum::splat(0.5))
    }
}

impl ComputationNode for MicrofacetBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("MicrofacetBSDF[alpha = {}, int_ior = {}, ext_ior = {}, kd = ({}, {}, {}), ks = {}]",
                self.alpha, self.int_ior, self.ext_ior, self.kd[0], self.kd[1], self.kd[2], self.ks)
    }
}

impl BSDF for MicrofacetBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> BSDFValue {
        if record.measure != Measure::SolidAngle
            || Frame::cos_theta(&record.wi) <= 0.0
            || Frame::cos_theta(&record.wo) <= 0.0 {
            return RGBSpectrum::zero();
        }

        let h = (record.wi + record.wo).normalize();
        self.kd * INV_PI + RGBSpectrum::splat(self.specular(&record.wi, &record.wo, &h))
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if record.measure != Measure::SolidAngle
            || Frame::cos_theta(&record.wi) <= 0.0
            || Frame::cos_theta(&record.wo) <= 0.0 {
            return 0.0;
        }

        let h = (record.wi + record.wo).normalize();
        let h_dot_wo = h.dot(&record.wo);
        let pdf_specular = if h_dot_wo > 0.0 {
            self.ks * square_to_beckmann_pdf(&h, self.alpha) / (4.0 * h_dot_wo)
        } else {
            0.0
        };
        let pdf_diffuse = (1.0 - self.ks) * INV_PI * Frame::cos_theta(&record.wo);

        pdf_specular + pdf_diffuse
    }

    fn sample(&self, record: &mut BSDFQueryRecord, u: &Vector2f) -> BSDFValue {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::zero();
        }
        record.measure = Measure::SolidAngle;

        if self.ks > 0.0 && u.x <= self.ks {
            let remapped = Vector2f::new((u.x / self.ks).min(ONE_MINUS_EPSILON), u.y);
            let m = square_to_beckmann(&remapped, self.alpha);
            if square_to_beckmann_pdf(&m, self.alpha) <= 0.0 {
                return RGBSpectrum::zero();
            }
            record.wo = reflect(&record.wi, &m);
        } else {
            let remapped = Vector2f::new((u.x - self.ks) / (1.0 - self.ks), u.y);
            record.wo = square_to_cosine_hemisphere(&remapped);
        }

        if Frame::cos_theta(&record.wo) <= 0.0 {
            return RGBSpectrum::zero();
        }

        // Weight by the density of the full two-lobe mixture.
        let pdf = self.pdf(record);
        if pdf <= 0.0 {
            return RGBSpectrum::zero();
        }
        self.eval(record) * (Frame::cos_theta(&record.wo) / pdf)
    }

    fn is_diffuse(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::Sampler;
    use crate::samplers::independent::IndependentSampler;
    use crate::math::warp::square_to_cosine_hemisphere_pdf;
    use approx::assert_relative_eq;

    fn mean_sampled_albedo(bsdf: &MicrofacetBSDF, wi: Vector3f, n: usize, seed: u64) -> RGBSpectrum {
        let mut sampler = IndependentSampler::new(seed);
        let mut total = RGBSpectrum::zero();
        for _ in 0..n {
            let mut record = BSDFQueryRecord::new(wi, Vector2f::zeros());
            let value = bsdf.sample(&mut record, &sampler.next_2d());
            assert!(!value.has_nan());
            total += value;
        }
        total / n as Float
    }

    #[test]
    fn test_fresnel_limits() {
        // Normal incidence on glass: ((1.5 - 1) / (1.5 + 1))^2.
        assert_relative_eq!(fresnel_dielectric(1.0, 1.0, 1.5), 0.04, epsilon = 1e-5);
        assert_relative_eq!(fresnel_dielectric(1e-4, 1.0, 1.5), 1.0, epsilon = 1e-2);
        assert_eq!(fresnel_dielectric(0.1, 1.5, 1.5), 0.0);
        // Leaving glass at a grazing angle is total internal reflection.
        assert_eq!(fresnel_dielectric(-0.2, 1.0, 1.5), 1.0);
    }

    #[test]
    fn test_reflect_and_smith() {
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let m = Vector3f::new(0.0, 0.0, 1.0);
        let wo = reflect(&wi, &m);
        assert_relative_eq!(wo.x, -0.6, epsilon = 1e-6);
        assert_relative_eq!(wo.z, 0.8, epsilon = 1e-6);

        assert_eq!(smith_g1_beckmann(&m, &m, 0.3), 1.0);
        let grazing = Vector3f::new(0.999, 0.0, 0.0447).normalize();
        let g = smith_g1_beckmann(&grazing, &m, 0.3);
        assert!(g > 0.0 && g < 1.0);
        assert_eq!(smith_g1_beckmann(&wi, &Vector3f::new(-1.0, 0.0, 0.0), 0.3), 0.0);
    }

    #[test]
    fn test_energy_conservation() {
        let bsdf = MicrofacetBSDF::new(0.2, 1.5046, 1.000277, RGBSpectrum::new(0.3, 0.5, 0.2));
        for wi in [Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.6, 0.0, 0.8), Vector3f::new(0.0, 0.95, 0.3122).normalize()] {
            let albedo = mean_sampled_albedo(&bsdf, wi, 100_000, 5);
            for c in 0..3 {
                assert!(albedo[c] <= 1.0, "channel {} reflects {}", c, albedo[c]);
                assert!(albedo[c] > 0.0);
            }
        }
    }

    #[test]
    fn test_sample_matches_eval_over_pdf() {
        // The sampled estimate and a cosine-weighted estimate of the same
        // integral must agree.
        let bsdf = MicrofacetBSDF::new(0.3, 1.5046, 1.000277, RGBSpectrum::splat(0.4));
        let wi = Vector3f::new(0.5, 0.0, 0.866).normalize();
        let n = 200_000;
        let sampled = mean_sampled_albedo(&bsdf, wi, n, 77);

        let mut sampler = IndependentSampler::new(78);
        let mut reference = 0.0;
        for _ in 0..n {
            let wo = square_to_cosine_hemisphere(&sampler.next_2d());
            let pdf = square_to_cosine_hemisphere_pdf(&wo);
            if pdf <= 0.0 {
                continue;
            }
            let record = BSDFQueryRecord::with_directions(wi, wo, Vector2f::zeros());
            reference += bsdf.eval(&record)[0] * wo.z / pdf;
        }
        let reference = reference / n as Float;
        assert_relative_eq!(sampled[0], reference, max_relative = 0.03);
    }

    #[test]
    fn test_diffuse_term_is_reciprocal() {
        let bsdf = MicrofacetBSDF::default();
        let a = Vector3f::new(0.3, -0.2, 0.93).normalize();
        let b = Vector3f::new(-0.7, 0.1, 0.7).normalize();
        let ab = bsdf.eval(&BSDFQueryRecord::with_directions(a, b, Vector2f::zeros()));
        let ba = bsdf.eval(&BSDFQueryRecord::with_directions(b, a, Vector2f::zeros()));
        let diffuse = 0.5 * INV_PI;
        // The diffuse part is identical both ways; the specular part differs only through Fresnel.
        assert!(ab[0] >= diffuse && ba[0] >= diffuse);
        let sa = bsdf.specular(&a, &b, &(a + b).normalize());
        let sb = bsdf.specular(&b, &a, &(a + b).normalize());
        assert_relative_eq!(ab[0] - sa, ba[0] - sb, epsilon = 1e-6);
    }

    #[test]
    fn test_below_horizon_is_zero() {
        let bsdf = MicrofacetBSDF::default();
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let down = Vector3f::new(0.0, 0.0, -1.0);
        assert!(bsdf.eval(&BSDFQueryRecord::with_directions(down, up, Vector2f::zeros())).is_black());
        assert_eq!(bsdf.pdf(&BSDFQueryRecord::with_directions(up, down, Vector2f::zeros())), 0.0);

        let mut record = BSDFQueryRecord::new(down, Vector2f::zeros());
        assert!(bsdf.sample(&mut record, &Vector2f::new(0.2, 0.2)).is_black());

        // Unknown measure.
        let mut unknown = BSDFQueryRecord::with_directions(up, up, Vector2f::zeros());
        unknown.measure = Measure::Unknown;
        assert!(bsdf.eval(&unknown).is_black());
    }
}
