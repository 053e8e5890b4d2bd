// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };

/// Source of uniform variates on `[0, 1)`.
///
/// Each ray owns its sampler; streams obtained through `clone_seeded` are
/// independent of each other.
pub trait Sampler: Send {
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }

    fn clone_seeded(&self, stream: u64) -> Box<dyn Sampler>;
}
