//! Live stream settings.

use std::time::Duration;

use cz_ir::DEFAULT_SAMPLE_RATE;

use crate::error::{LiveError, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveConfig {
    pub sample_rate: u32,
    /// Samples in one consumer read.
    pub block_size: usize,
    /// Generation pauses once this many blocks are queued.
    pub watermark_blocks: usize,
    /// Transition progress added per generation loop iteration, in seconds.
    pub tick_seconds: f64,
    /// Sleep while the queue is above the watermark.
    pub idle_sleep: Duration,
    /// How long `stop` waits for the generation thread.
    pub stop_timeout: Duration,
    pub seed: Option<u64>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: 4096,
            watermark_blocks: 10,
            tick_seconds: 0.05,
            idle_sleep: Duration::from_millis(10),
            stop_timeout: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl LiveConfig {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Queue depth, in samples, above which generation pauses.
    pub fn watermark(&self) -> usize {
        self.block_size * self.watermark_blocks
    }

    /// Ring capacity: twice the watermark, so a note rendered just under
    /// the watermark usually fits without waiting.
    pub fn capacity(&self) -> usize {
        self.watermark() * 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(LiveError::InvalidConfig("sample rate must be positive"));
        }
        if self.block_size == 0 || self.watermark_blocks == 0 {
            return Err(LiveError::InvalidConfig("watermark must be positive"));
        }
        if !(self.tick_seconds.is_finite() && self.tick_seconds > 0.0) {
            return Err(LiveError::InvalidConfig("tick must be a positive time"));
        }
        Ok(())
    }
}
