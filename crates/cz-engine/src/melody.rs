//! Motif-based melody generation.
//!
//! A pass builds a handful of motifs from the melodic register, then walks
//! them: each motif is played through, after which the line either moves
//! on to the next motif or takes one smooth voice-leading step before
//! replaying the current one. Durations and rests follow the mood.

use cz_ir::{
    semitone_ratio, Chord, ChordProgression, MelodyPattern, Mood, Motif, MusicParameters,
    NoteEvent, ScaleNoteTable, VoiceProfile,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Chance of moving to the next motif once the current one is exhausted.
const ADVANCE_PROBABILITY: f64 = 0.3;

/// Chance a voice-leading step snaps onto the nearest chord tone.
const CHORD_SNAP_PROBABILITY: f64 = 0.3;

/// Beats per chord in every layer.
pub const BEATS_PER_CHORD: f64 = 4.0;

/// Length of a rest, in beats.
const REST_BEATS: f64 = 0.25;

/// Generate the melody layer for one pass.
pub fn generate<R: Rng + ?Sized>(
    params: &MusicParameters,
    table: &ScaleNoteTable,
    progression: &ChordProgression,
    rng: &mut R,
) -> Vec<NoteEvent> {
    let range = table.melody_range();
    let motifs = build_motifs(params.melody_pattern, range, progression, rng);
    if motifs.is_empty() {
        return Vec::new();
    }
    let beat = params.beat_seconds();
    let chord_length = beat * BEATS_PER_CHORD;
    let rest_probability = rest_probability(params.mood);

    let mut walker = MotifWalker::new(&motifs);
    let mut events = Vec::new();
    let mut time = 0.0;
    let mut chord_index = 0;

    while time < params.duration {
        let chord = progression.chord(chord_index);
        let frequency = walker.next_note(range, chord, rng);
        let duration = note_duration(params.mood, beat, rng);
        events.push(NoteEvent::new(frequency, time, duration, params.volume, VoiceProfile::MELODY));
        time += duration;

        if rng.gen_bool(rest_probability) {
            time += beat * REST_BEATS;
        }
        chord_index = chord_at(time, chord_length);
    }
    events
}

/// Index of the chord sounding at `time`; chords change every `chord_length` seconds.
fn chord_at(time: f64, chord_length: f64) -> usize {
    (time / chord_length) as usize
}

/// Where the walker is within its motif cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WalkState {
    /// Playing `motif`; `position` is the next note to emit.
    UsingMotif { motif: usize, position: usize },
    /// `motif` has been played through.
    ChoosingTransition { motif: usize },
}

struct MotifWalker<'a> {
    motifs: &'a [Motif],
    state: WalkState,
    last: f32,
}

impl<'a> MotifWalker<'a> {
    fn new(motifs: &'a [Motif]) -> Self {
        Self {
            motifs,
            state: WalkState::UsingMotif { motif: 0, position: 0 },
            last: motifs[0].first(),
        }
    }

    fn next_note<R: Rng + ?Sized>(&mut self, range: &[f32], chord: &Chord, rng: &mut R) -> f32 {
        let note = match self.state {
            WalkState::UsingMotif { motif, position } => {
                let notes = self.motifs[motif].notes();
                self.state = if position + 1 >= notes.len() {
                    WalkState::ChoosingTransition { motif }
                } else {
                    WalkState::UsingMotif { motif, position: position + 1 }
                };
                notes[position]
            }
            WalkState::ChoosingTransition { motif } => {
                if rng.gen_bool(ADVANCE_PROBABILITY) {
                    let next = (motif + 1) % self.motifs.len();
                    let notes = self.motifs[next].notes();
                    // The first note is emitted here, so resume at the second.
                    self.state = if notes.len() > 1 {
                        WalkState::UsingMotif { motif: next, position: 1 }
                    } else {
                        WalkState::ChoosingTransition { motif: next }
                    };
                    notes[0]
                } else {
                    self.state = WalkState::UsingMotif { motif, position: 0 };
                    smooth_step(range, chord, self.last, rng)
                }
            }
        };
        self.last = note;
        note
    }
}

/// Build the motif set for a pass. Motif `m` is drawn against chord
/// `m` of the progression.
pub fn build_motifs<R: Rng + ?Sized>(
    pattern: MelodyPattern,
    range: &[f32],
    progression: &ChordProgression,
    rng: &mut R,
) -> Vec<Motif> {
    let count = match pattern {
        MelodyPattern::Repetitive | MelodyPattern::Minimal => rng.gen_range(1..=2),
        MelodyPattern::Sequence | MelodyPattern::Ornamental => rng.gen_range(3..=4),
        _ => rng.gen_range(2..=3),
    };
    (0..count)
        .filter_map(|m| build_motif(pattern, range, progression.chord(m), rng))
        .collect()
}

/// Build one motif with the given strategy. `None` only for an empty range.
pub fn build_motif<R: Rng + ?Sized>(
    pattern: MelodyPattern,
    range: &[f32],
    chord: &Chord,
    rng: &mut R,
) -> Option<Motif> {
    if range.is_empty() {
        return None;
    }
    let notes = match pattern {
        MelodyPattern::Stepwise => stepwise(range, rng),
        MelodyPattern::Jumping => jumping(range, chord, rng),
        MelodyPattern::Arpeggiated => arpeggiated(range, chord, rng),
        MelodyPattern::Repetitive => repetitive(range, chord, rng),
        MelodyPattern::ScaleRun => scale_run(range, rng),
        MelodyPattern::Syncopated => syncopated(range, chord, rng),
        MelodyPattern::Sequence => sequence(range, rng),
        MelodyPattern::Balanced => balanced(range, chord, rng),
        MelodyPattern::Minimal => minimal(range, chord, rng),
        MelodyPattern::Ornamental => ornamental(range, rng),
    };
    Motif::new(notes)
}

fn stepwise<R: Rng + ?Sized>(range: &[f32], rng: &mut R) -> Vec<f32> {
    walk(range, rng.gen_range(5..=8), rng)
}

fn ornamental<R: Rng + ?Sized>(range: &[f32], rng: &mut R) -> Vec<f32> {
    walk(range, rng.gen_range(8..=12), rng)
}

/// Random walk of `len` notes from the upper half of `range`, moving at
/// most two steps at a time.
fn walk<R: Rng + ?Sized>(range: &[f32], len: usize, rng: &mut R) -> Vec<f32> {
    let n = range.len();
    let mut index = rng.gen_range(n / 2..n);
    let mut notes = Vec::with_capacity(len);
    notes.push(range[index]);
    for _ in 1..len {
        index = clamp_index(index as isize + rng.gen_range(-2..=2), n);
        notes.push(range[index]);
    }
    notes
}

fn jumping<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let len = rng.gen_range(4..=6);
    (0..len).map(|_| pick_chord_tone(range, chord, rng)).collect()
}

fn arpeggiated<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let mut tones = chord_tones(range, chord);
    if !rng.gen_bool(0.5) {
        tones.reverse();
    }
    tones.repeat(2)
}

fn repetitive<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let note = pick_chord_tone(range, chord, rng);
    let mut notes = vec![note; rng.gen_range(3..=5)];
    let departure = clamp_index(nearest_index(range, note) as isize + rng.gen_range(-3..=3), range.len());
    notes.push(range[departure]);
    notes
}

fn scale_run<R: Rng + ?Sized>(range: &[f32], rng: &mut R) -> Vec<f32> {
    let len = rng.gen_range(5..=7).min(range.len());
    if rng.gen_bool(0.5) {
        range[..len].to_vec()
    } else {
        range.iter().rev().take(len).copied().collect()
    }
}

fn syncopated<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let tones = chord_tones(range, chord);
    (0..6).filter_map(|_| tones.choose(rng).copied()).collect()
}

/// A three-note ascending cell, played three times, each repetition two
/// steps higher. The start is chosen so the top of the figure fits in
/// the range where possible; otherwise indices clamp to the top note.
fn sequence<R: Rng + ?Sized>(range: &[f32], rng: &mut R) -> Vec<f32> {
    let n = range.len();
    let low = n / 2;
    let high = low.max(n.saturating_sub(9));
    let start = rng.gen_range(low..=high);
    let mut notes = Vec::with_capacity(9);
    for repetition in 0..3 {
        for step in 0..3 {
            notes.push(range[(start + step + repetition * 2).min(n - 1)]);
        }
    }
    notes
}

fn minimal<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let count = rng.gen_range(2..=3);
    let cell: Vec<f32> = (0..count).map(|_| pick_chord_tone(range, chord, rng)).collect();
    (0..8).map(|i| cell[i % count]).collect()
}

fn balanced<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> Vec<f32> {
    let n = range.len();
    let len = rng.gen_range(5..=7);
    let mut current = pick_chord_tone(range, chord, rng);
    let mut notes = Vec::with_capacity(len);
    notes.push(current);
    for _ in 1..len {
        let roll: f64 = rng.gen();
        current = if roll < 0.6 {
            let step = rng.gen_range(-2..=2);
            range[clamp_index(nearest_index(range, current) as isize + step, n)]
        } else if roll < 0.9 {
            pick_chord_tone(range, chord, rng)
        } else {
            range[rng.gen_range(n / 2..n)]
        };
        notes.push(current);
    }
    notes
}

/// Chord tones mapped into `range`: each chord semitone is taken above the
/// bottom of the range and snapped to the nearest available note.
/// Duplicates are dropped, order is kept. Never empty for a non-empty range.
pub fn chord_tones(range: &[f32], chord: &Chord) -> Vec<f32> {
    let base = range[0];
    let mut tones: Vec<f32> = Vec::with_capacity(chord.intervals().len());
    for semitones in chord.semitones() {
        let note = range[nearest_index(range, base * semitone_ratio(semitones))];
        if !tones.contains(&note) {
            tones.push(note);
        }
    }
    if tones.is_empty() {
        tones.push(range[range.len() / 2]);
    }
    tones
}

fn pick_chord_tone<R: Rng + ?Sized>(range: &[f32], chord: &Chord, rng: &mut R) -> f32 {
    let tones = chord_tones(range, chord);
    tones[rng.gen_range(0..tones.len())]
}

/// Index of the note in `range` closest to `frequency`.
pub fn nearest_index(range: &[f32], frequency: f32) -> usize {
    range
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - frequency).abs().total_cmp(&(*b - frequency).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Move from `from_index` by a random non-zero amount of at most
/// `max_step` scale steps, clamped to the range.
pub fn leap<R: Rng + ?Sized>(range: &[f32], from_index: usize, max_step: usize, rng: &mut R) -> usize {
    let magnitude = rng.gen_range(1..=max_step.max(1)) as isize;
    let step = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    clamp_index(from_index as isize + step, range.len())
}

/// One voice-leading step away from `last`: mostly one or two scale steps,
/// sometimes three, occasionally pulled onto the nearest chord tone.
pub fn smooth_step<R: Rng + ?Sized>(range: &[f32], chord: &Chord, last: f32, rng: &mut R) -> f32 {
    let max_step = if rng.gen_bool(0.7) { 2 } else { 3 };
    let note = range[leap(range, nearest_index(range, last), max_step, rng)];
    if rng.gen_bool(CHORD_SNAP_PROBABILITY) {
        let tones = chord_tones(range, chord);
        tones[nearest_index(&tones, note)]
    } else {
        note
    }
}

fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len as isize - 1) as usize
}

/// Note lengths in beats, drawn uniformly per note.
pub fn note_lengths(mood: Mood) -> &'static [f64] {
    match mood {
        Mood::Energetic => &[0.25, 0.5, 0.5, 1.0],
        Mood::Calm => &[1.0, 1.5, 2.0, 2.0],
        Mood::Happy => &[0.5, 0.5, 1.0, 1.0],
        Mood::Sad => &[1.0, 1.5, 2.0],
        Mood::Mysterious => &[0.5, 1.0, 1.5, 2.0],
        Mood::Neutral => &[0.5, 1.0, 1.0, 2.0],
    }
}

fn note_duration<R: Rng + ?Sized>(mood: Mood, beat: f64, rng: &mut R) -> f64 {
    let lengths = note_lengths(mood);
    lengths[rng.gen_range(0..lengths.len())] * beat
}

/// Chance of a short rest after each note.
pub fn rest_probability(mood: Mood) -> f64 {
    match mood {
        Mood::Calm => 0.3,
        Mood::Mysterious => 0.4,
        Mood::Energetic => 0.1,
        _ => 0.2,
    }
}
