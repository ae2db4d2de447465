//! ADSR amplitude envelopes and per-layer voicing profiles.
//!
//! An envelope is evaluated per sample index over a note of known length,
//! so a note is always shaped from 0 back down to 0 regardless of how the
//! attack, decay and release times compare to the note duration.

use core::f32::consts::FRAC_PI_2;

/// Interpolation curve for one envelope segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    /// Straight line between the endpoints.
    Linear,
    /// Sine quarter-wave: fast start, gentle arrival.
    SineQuarter,
}

/// Interpolate between two values using the given curve at position `t` (0.0..=1.0).
pub fn interpolate(curve: CurveKind, from: f32, to: f32, t: f32) -> f32 {
    let factor = match curve {
        CurveKind::Linear => t,
        CurveKind::SineQuarter => libm::sinf(t * FRAC_PI_2),
    };
    from + (to - from) * factor
}

/// Attack/decay/sustain/release shape. Times in seconds, sustain as a
/// fraction of peak amplitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f32,
    pub release: f64,
}

impl Adsr {
    pub const fn new(attack: f64, decay: f64, sustain: f32, release: f64) -> Self {
        Self { attack, decay, sustain, release }
    }

    /// Resolve this shape against a note of `total` samples.
    ///
    /// If attack + decay + release is longer than the note, all three are
    /// scaled down by the same factor so the hold phase becomes empty.
    pub fn layout(&self, total: usize, sample_rate: u32) -> EnvelopeLayout {
        let sr = sample_rate as f64;
        let attack = self.attack.max(0.0);
        let decay = self.decay.max(0.0);
        let release = self.release.max(0.0);
        let phases = attack + decay + release;
        let duration = total as f64 / sr;
        let scale = if phases > duration && phases > 0.0 { duration / phases } else { 1.0 };

        let attack = (libm::round(attack * scale * sr) as usize).min(total);
        let decay = (libm::round(decay * scale * sr) as usize).min(total - attack);
        let release = (libm::round(release * scale * sr) as usize).min(total - attack - decay);

        EnvelopeLayout {
            attack,
            decay,
            release,
            total,
            sustain: self.sustain.clamp(0.0, 1.0),
        }
    }
}

/// An [`Adsr`] resolved to sample counts for one note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeLayout {
    attack: usize,
    decay: usize,
    release: usize,
    total: usize,
    sustain: f32,
}

impl EnvelopeLayout {
    /// First sample index of the release phase.
    pub fn release_start(&self) -> usize {
        self.total - self.release
    }

    /// Sample count of the hold phase.
    pub fn hold(&self) -> usize {
        self.total - self.attack - self.decay - self.release
    }

    /// Envelope gain at sample `index`, always within 0.0..=1.0.
    pub fn level(&self, index: usize) -> f32 {
        if index < self.attack {
            let t = index as f32 / self.attack as f32;
            interpolate(CurveKind::SineQuarter, 0.0, 1.0, t)
        } else if index < self.attack + self.decay {
            let t = (index - self.attack) as f32 / self.decay as f32;
            interpolate(CurveKind::Linear, 1.0, self.sustain, t)
        } else if index >= self.release_start() {
            if index >= self.total {
                return 0.0;
            }
            let remaining = (self.total - index) as f32 / self.release as f32;
            interpolate(CurveKind::SineQuarter, 0.0, self.sustain, remaining)
        } else {
            self.sustain
        }
    }
}

/// How one layer voices its notes: envelope shape plus carrier gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceProfile {
    pub envelope: Adsr,
    /// Carrier amplitude as a fraction of the note volume.
    pub gain: f32,
}

impl VoiceProfile {
    /// Lead line: quick attack, short release, sits back in the mix.
    pub const MELODY: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.01, 0.05, 0.6, 0.02), gain: 0.7 };
    /// Chord tones: softer attack to blend.
    pub const HARMONY: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.05, 0.1, 0.7, 0.05), gain: 1.0 };
    /// Long chord tones with an extended attack and tail.
    pub const SUSTAINED: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.1, 0.2, 0.8, 0.2), gain: 1.0 };
    /// Very soft swell for pad textures.
    pub const PAD: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.3, 0.3, 0.7, 0.2), gain: 1.0 };
    /// Punchy bass pulse.
    pub const BASS: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.005, 0.03, 0.8, 0.067), gain: 1.0 };
    /// Reference tones bridging two sections of an offline render.
    pub const TRANSITION: VoiceProfile = VoiceProfile { envelope: Adsr::new(0.05, 0.1, 0.5, 0.05), gain: 0.3 };
}
