// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::math::constants::Float;

use rand::{ distributions::Standard, Rng };
use rand_pcg::Pcg32;

pub struct IndependentSampler {
    rng: Pcg32,
    // Kept so seeded clones share the state and differ only in stream.
    seed: u64,
}

impl IndependentSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: Pcg32::new(seed, 0), seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Sampler for IndependentSampler {
    fn next_1d(&mut self) -> Float {
        self.rng.sample(Standard)
    }

    fn clone_seeded(&self, stream: u64) -> Box<dyn Sampler> {
        Box::new(Self { rng: Pcg32::new(self.seed, stream), seed: self.seed })
    }
}
