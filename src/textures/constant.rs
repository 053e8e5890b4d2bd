// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{ Float, Vector2f };
use crate::math::spectrum::RGBSpectrum;

pub struct ConstantTexture {
    value: RGBSpectrum,
}

impl ConstantTexture {
    pub fn new(value: RGBSpectrum) -> Self {
        Self { value }
    }

    pub fn gray(value: Float) -> Self {
        Self::new(RGBSpectrum::splat(value))
    }
}

impl Default for ConstantTexture {
    fn default() -> Self {
        Self::gray(0.5)
    }
}

impl Texture for ConstantTexture {
    fn eval(&self, _uv: Vector2f) -> RGBSpectrum {
        self.value
    }

    fn describe(&self) -> String {
        format!("ConstantTexture[value = ({}, {}, {})]", self.value[0], self.value[1], self.value[2])
    }
}

#[cfg(test)]
mod tests {
    use super::ConstantTexture;
    use crate::core::texture::Texture;
    use crate::math::constants::Vector2f;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_constant_texture_ignores_uv() {
        let tex = ConstantTexture::new(RGBSpectrum::new(0.25, 0.5, 0.75));
        assert_eq!(tex.eval(Vector2f::new(0.1, 0.9)), tex.eval(Vector2f::new(-3.0, 7.5)));
        assert_eq!(ConstantTexture::default().eval(Vector2f::zeros()), RGBSpectrum::splat(0.5));
    }
}
