//! Offline render settings.

use cz_ir::{Error, Result, DEFAULT_SAMPLE_RATE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Settings for an offline render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub sample_rate: u32,
    /// Fixed generator seed. `None` draws a fresh one per renderer.
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { sample_rate: DEFAULT_SAMPLE_RATE, seed: None }
    }
}

impl RenderConfig {
    /// Default settings with a fixed seed, for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    pub fn with_sample_rate(self, sample_rate: u32) -> Self {
        Self { sample_rate, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidSampleRate);
        }
        Ok(())
    }

    /// The seed to use: the configured one or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Deterministic generator for a resolved seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
