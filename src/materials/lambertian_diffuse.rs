// Copyright @yucwang 2023

use crate::core::bsdf::{ BSDFQueryRecord, BSDFValue, BSDF };
use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::interaction::Measure;
use crate::core::texture::Texture;
use crate::math::constants::{ Float, Vector2f, INV_PI };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_cosine_hemisphere;
use crate::textures::constant::ConstantTexture;

use std::sync::Arc;

pub struct LambertianDiffuseBSDF {
    id: String,
    albedo: Arc<dyn Texture>,
}

impl LambertianDiffuseBSDF {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { id: generate_node_id("diffuse"), albedo }
    }

    pub fn from_color(rgb: RGBSpectrum) -> Self {
        Self::new(Arc::new(ConstantTexture::new(rgb)))
    }
}

impl Default for LambertianDiffuseBSDF {
    fn default() -> Self {
        Self::new(Arc::new(ConstantTexture::default()))
    }
}

impl ComputationNode for LambertianDiffuseBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("LambertianDiffuseBSDF[albedo = {}]", self.albedo.describe())
    }
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, record: &BSDFQueryRecord) -> BSDFValue {
        if record.measure != Measure::SolidAngle
            || Frame::cos_theta(&record.wi) <= 0.0
            || Frame::cos_theta(&record.wo) <= 0.0 {
            return RGBSpectrum::zero();
        }
        self.albedo.eval(record.uv) * INV_PI
    }

    fn pdf(&self, record: &BSDFQueryRecord) -> Float {
        if record.measure != Measure::SolidAngle
            || Frame::cos_theta(&record.wi) <= 0.0
            || Frame::cos_theta(&record.wo) <= 0.0 {
            return 0.0;
        }
        INV_PI * Frame::cos_theta(&record.wo)
    }

    fn sample(&self, record: &mut BSDFQueryRecord, u: &Vector2f) -> BSDFValue {
        if Frame::cos_theta(&record.wi) <= 0.0 {
            return RGBSpectrum::zero();
        }
        record.measure = Measure::SolidAngle;
        record.wo = square_to_cosine_hemisphere(u);

        // eval * cos / pdf reduces to the albedo.
        self.albedo.eval(record.uv)
    }

    fn is_diffuse(&self) -> bool {
        true
    }
}
