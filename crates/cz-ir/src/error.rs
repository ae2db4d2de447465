//! Validation errors for parameter and theory values.

use thiserror::Error;

/// Rejection reasons for malformed generation inputs.
///
/// These are raised before any synthesis starts so a bad value never
/// corrupts output mid-stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("tempo must be a positive, finite BPM (got {0})")]
    InvalidTempo(f32),

    #[error("duration must be a positive, finite number of seconds (got {0})")]
    InvalidDuration(f64),

    #[error("volume must lie within 0..=1 (got {0})")]
    InvalidVolume(f32),

    #[error("sample rate must be non-zero")]
    InvalidSampleRate,

    #[error("chord has no intervals")]
    EmptyChord,

    #[error("chord progression has no chords")]
    EmptyProgression,

    #[error("scale note table is empty")]
    EmptyScale,

    #[error("parameter change #{index}: {reason}")]
    InvalidChange { index: usize, reason: String },
}

pub type Result<T> = core::result::Result<T, Error>;
