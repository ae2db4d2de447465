//! Single-voice melodic line for the live stream.
//!
//! Much cheaper than the three-layer offline arrangement: one note at a
//! time, each a short random leap from the last, rendered with a simple
//! linear attack/release.

use core::f64::consts::TAU;

use cz_engine::melody::{chord_tones, nearest_index};
use cz_engine::shaping::limit;
use cz_engine::{samples_for, seeded_rng};
use cz_ir::{ChordProgression, Mood, MusicParameters, ScaleNoteTable, LIMITER_THRESHOLD};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Largest leap between consecutive notes, in scale steps.
const MAX_LEAP: isize = 3;
const SNAP_PROBABILITY: f64 = 0.3;
const NOTES_PER_CHORD: u64 = 8;
const LEVEL: f32 = 0.3;
const ATTACK: f64 = 0.01;
const RELEASE: f64 = 0.05;

pub struct LiveVoice {
    rng: ChaCha8Rng,
    sample_rate: u32,
    table: ScaleNoteTable,
    progression: ChordProgression,
    last: f32,
    notes: u64,
    chord_index: usize,
}

impl LiveVoice {
    pub fn new(params: &MusicParameters, seed: u64, sample_rate: u32) -> Self {
        let table = ScaleNoteTable::new(params.scale, params.mood);
        let range = table.melody_range();
        let last = range[range.len() / 2];
        Self {
            rng: seeded_rng(seed),
            sample_rate,
            progression: ChordProgression::for_mood(params.mood),
            table,
            last,
            notes: 0,
            chord_index: 0,
        }
    }

    /// Rebuild the note table and progression for a committed parameter set.
    pub fn retune(&mut self, params: &MusicParameters) {
        self.table = ScaleNoteTable::new(params.scale, params.mood);
        self.progression = ChordProgression::for_mood(params.mood);
    }

    /// Notes rendered so far.
    pub fn notes(&self) -> u64 {
        self.notes
    }

    /// Render the next note into `out`, replacing its contents.
    pub fn render_next(&mut self, params: &MusicParameters, out: &mut Vec<f32>) {
        let range = self.table.melody_range();
        let from = nearest_index(range, self.last) as isize;
        let index = (from + self.rng.gen_range(-MAX_LEAP..=MAX_LEAP)).clamp(0, range.len() as isize - 1);
        let mut frequency = range[index as usize];
        if self.rng.gen_bool(SNAP_PROBABILITY) {
            let tones = chord_tones(range, self.progression.chord(self.chord_index));
            frequency = tones[nearest_index(&tones, frequency)];
        }
        self.last = frequency;

        let lengths = note_lengths(params.mood);
        let duration = params.beat_seconds() * lengths[self.rng.gen_range(0..lengths.len())];
        let total = samples_for(duration, self.sample_rate);
        let sr = self.sample_rate as f64;
        let omega = TAU * frequency as f64;
        let level = params.volume * LEVEL;

        out.clear();
        out.extend((0..total).map(|i| {
            let t = i as f64 / sr;
            libm::sin(omega * t) as f32 * level * envelope(t, duration)
        }));
        limit(out, LIMITER_THRESHOLD);

        self.notes += 1;
        if self.notes % NOTES_PER_CHORD == 0 {
            self.chord_index += 1;
        }
        trace!(frequency, duration, samples = total, "live note");
    }
}

/// Live note lengths in beats.
fn note_lengths(mood: Mood) -> &'static [f64] {
    match mood {
        Mood::Energetic => &[0.25, 0.5],
        Mood::Calm => &[1.0, 1.5],
        _ => &[0.5, 1.0],
    }
}

/// Linear attack and release; whichever ramp is lower wins on notes too
/// short for both.
fn envelope(t: f64, duration: f64) -> f32 {
    let attack = t / ATTACK;
    let release = (duration - t) / RELEASE;
    attack.min(release).clamp(0.0, 1.0) as f32
}
