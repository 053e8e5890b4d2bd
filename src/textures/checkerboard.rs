// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{ Float, Vector2f };
use crate::math::spectrum::RGBSpectrum;

/// Two-color checker pattern with four tiles per unit of (scaled) uv.
pub struct CheckerboardTexture {
    color0: RGBSpectrum,
    color1: RGBSpectrum,
    uv_offset: Vector2f,
    uv_scale: Vector2f,
}

impl CheckerboardTexture {
    pub fn new(color0: RGBSpectrum, color1: RGBSpectrum) -> Self {
        Self { color0, color1, uv_offset: Vector2f::zeros(), uv_scale: Vector2f::new(1.0, 1.0) }
    }

    pub fn with_transform(mut self, uv_offset: Vector2f, uv_scale: Vector2f) -> Self {
        self.uv_offset = uv_offset;
        self.uv_scale = uv_scale;
        self
    }

    // Maps a coordinate to -1 or +1 depending on the parity of its tile.
    fn tile_sign(x: Float) -> i32 {
        2 * ((x * 2.0) as i32).rem_euclid(2) - 1
    }
}

impl Default for CheckerboardTexture {
    fn default() -> Self {
        Self::new(RGBSpectrum::splat(0.4), RGBSpectrum::splat(0.2))
    }
}

impl Texture for CheckerboardTexture {
    fn eval(&self, uv: Vector2f) -> RGBSpectrum {
        let uv2 = uv.component_mul(&self.uv_scale) + self.uv_offset;
        if Self::tile_sign(uv2.x) * Self::tile_sign(uv2.y) == 1 {
            self.color0
        } else {
            self.color1
        }
    }

    fn describe(&self) -> String {
        format!("CheckerboardTexture[offset = ({}, {}), scale = ({}, {})]",
                self.uv_offset.x, self.uv_offset.y, self.uv_scale.x, self.uv_scale.y)
    }
}
