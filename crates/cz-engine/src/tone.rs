//! Enveloped sine tones.

use core::f64::consts::TAU;

use cz_ir::{NoteEvent, VoiceProfile};

/// Number of samples covering `seconds` at `sample_rate`. Zero, negative
/// and non-finite durations map to no samples.
pub fn samples_for(seconds: f64, sample_rate: u32) -> usize {
    if seconds.is_finite() && seconds > 0.0 {
        libm::round(seconds * sample_rate as f64) as usize
    } else {
        0
    }
}

/// Synthesize one tone: a sine carrier shaped by the voice's ADSR.
///
/// The result always holds exactly `samples_for(duration)` samples.
/// A non-positive duration yields an empty buffer; a non-positive or
/// non-finite frequency yields silence of the requested length.
pub fn synthesize(
    frequency: f32,
    duration: f64,
    volume: f32,
    voice: VoiceProfile,
    sample_rate: u32,
) -> Vec<f32> {
    let total = samples_for(duration, sample_rate);
    if total == 0 {
        return Vec::new();
    }
    if !(frequency.is_finite() && frequency > 0.0) {
        return vec![0.0; total];
    }

    let layout = voice.envelope.layout(total, sample_rate);
    let amplitude = volume * voice.gain;
    let omega = TAU * frequency as f64 / sample_rate as f64;

    (0..total)
        .map(|i| libm::sin(omega * i as f64) as f32 * amplitude * layout.level(i))
        .collect()
}

/// Synthesize the tone for a note event (its start offset is ignored).
pub fn render_note(note: &NoteEvent, sample_rate: u32) -> Vec<f32> {
    synthesize(note.frequency, note.duration, note.volume, note.voice, sample_rate)
}
