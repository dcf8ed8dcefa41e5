//! Random source for the noise generators
//!
//! Every generator that needs randomness takes a `&mut NoiseSource`, so there
//! is no process-wide generator and a seeded run is reproducible.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Seedable source of standard-normal samples
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl NoiseSource {
    /// Deterministic source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Source seeded from OS entropy; successive runs differ
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Source for the track at `index` of a batch
    ///
    /// With a base seed every track gets its own stream `seed + index`, so a
    /// track renders identically whether or not its neighbours are rendered.
    pub fn for_track(base_seed: Option<u64>, index: usize) -> Self {
        match base_seed {
            Some(seed) => Self::seeded(seed.wrapping_add(index as u64)),
            None => Self::from_entropy(),
        }
    }

    /// Seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// One standard-normal sample
    #[inline]
    pub fn next_gaussian(&mut self) -> f32 {
        StandardNormal.sample(&mut self.rng)
    }

    /// `len` independent standard-normal samples (white noise)
    pub fn white(&mut self, len: usize) -> Vec<f32> {
        (0..len).map(|_| self.next_gaussian()).collect()
    }
}
