//! Chord and scale tables.
//!
//! Everything here is a pure function of (mood, scale): the same inputs
//! always produce the same progression and note table.

use arrayvec::ArrayVec;

use crate::error::{Error, Result};
use crate::parameters::{Mood, Scale};

/// Middle C. Base pitch of the scale table and the harmony register.
pub const BASE_FREQUENCY: f32 = 261.63;

/// C3, one octave below [`BASE_FREQUENCY`]. Base pitch of the bass layer.
pub const BASS_BASE_FREQUENCY: f32 = 130.81;

/// Maximum tones per chord.
pub const MAX_CHORD_TONES: usize = 6;

/// Number of chords in every mood progression.
pub const PROGRESSION_LENGTH: usize = 4;

/// Equal-tempered frequency ratio for a semitone offset.
pub fn semitone_ratio(semitones: i32) -> f32 {
    libm::powf(2.0, semitones as f32 / 12.0)
}

/// Shift `base` by `semitones` in 12-TET.
pub fn shift_frequency(base: f32, semitones: i32) -> f32 {
    base * semitone_ratio(semitones)
}

/// A chord: a root offset above the key plus intervals relative to it.
///
/// Intervals are ascending and always start at 0, so the first tone
/// is the chord root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    root: i32,
    intervals: ArrayVec<i32, MAX_CHORD_TONES>,
}

impl Chord {
    /// Build a chord, rejecting an empty interval list.
    ///
    /// Intervals beyond [`MAX_CHORD_TONES`] are dropped.
    pub fn new(root: i32, intervals: &[i32]) -> Result<Self> {
        if intervals.is_empty() {
            return Err(Error::EmptyChord);
        }
        let intervals = intervals.iter().copied().take(MAX_CHORD_TONES).collect();
        Ok(Self { root, intervals })
    }

    fn triad(root: i32, third: i32) -> Self {
        let mut intervals = ArrayVec::new();
        intervals.push(0);
        intervals.push(third);
        intervals.push(7);
        Self { root, intervals }
    }

    fn major(root: i32) -> Self {
        Self::triad(root, 4)
    }

    fn minor(root: i32) -> Self {
        Self::triad(root, 3)
    }

    /// Root offset in semitones above the key.
    pub fn root(&self) -> i32 {
        self.root
    }

    /// Intervals relative to the chord root.
    pub fn intervals(&self) -> &[i32] {
        &self.intervals
    }

    /// Absolute semitone offsets above the key, in chord order.
    pub fn semitones(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().map(move |i| self.root + i)
    }

    /// Absolute frequencies of every chord tone above `base`.
    pub fn frequencies(&self, base: f32) -> impl Iterator<Item = f32> + '_ {
        self.semitones().map(move |s| shift_frequency(base, s))
    }

    /// Frequency of the chord root above `base`.
    pub fn root_frequency(&self, base: f32) -> f32 {
        shift_frequency(base, self.root + self.intervals[0])
    }
}

/// An ordered chord sequence, looped to cover a piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordProgression {
    chords: Vec<Chord>,
}

impl ChordProgression {
    pub fn new(chords: Vec<Chord>) -> Result<Self> {
        if chords.is_empty() {
            return Err(Error::EmptyProgression);
        }
        Ok(Self { chords })
    }

    /// The progression for a mood.
    ///
    /// Happy and Neutral/Mysterious share I-IV-V-I; Sad is i-iv-v-i;
    /// Energetic is I-V-vi-IV; Calm is I-ii-IV-I.
    pub fn for_mood(mood: Mood) -> Self {
        let chords = match mood {
            Mood::Sad => vec![Chord::minor(0), Chord::minor(5), Chord::minor(7), Chord::minor(0)],
            Mood::Energetic => vec![Chord::major(0), Chord::major(7), Chord::minor(9), Chord::major(5)],
            Mood::Calm => vec![Chord::major(0), Chord::minor(2), Chord::major(5), Chord::major(0)],
            Mood::Happy | Mood::Mysterious | Mood::Neutral => {
                vec![Chord::major(0), Chord::major(5), Chord::major(7), Chord::major(0)]
            }
        };
        Self { chords }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Chord at `index`, wrapping around the progression.
    pub fn chord(&self, index: usize) -> &Chord {
        &self.chords[index % self.chords.len()]
    }

    /// Endless iterator over the progression.
    pub fn cycle(&self) -> impl Iterator<Item = &Chord> + '_ {
        self.chords.iter().cycle()
    }
}

impl Scale {
    /// Semitone offsets of one octave of this scale.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }
}

/// Ascending frequencies of a scale across two or three octaves.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleNoteTable {
    notes: Vec<f32>,
}

impl ScaleNoteTable {
    /// Wrap an explicit note list, rejecting an empty one.
    pub fn from_notes(notes: Vec<f32>) -> Result<Self> {
        if notes.is_empty() {
            return Err(Error::EmptyScale);
        }
        Ok(Self { notes })
    }

    /// Table for (scale, mood): two octaves above [`BASE_FREQUENCY`],
    /// three for Energetic.
    pub fn new(scale: Scale, mood: Mood) -> Self {
        let octaves = if mood == Mood::Energetic { 3 } else { 2 };
        let intervals = scale.intervals();
        let notes = (0..octaves)
            .flat_map(|octave| intervals.iter().map(move |i| octave * 12 + i))
            .map(|semitones| shift_frequency(BASE_FREQUENCY, semitones))
            .collect();
        Self { notes }
    }

    pub fn notes(&self) -> &[f32] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Upper half of the table, the register melodies are drawn from.
    pub fn melody_range(&self) -> &[f32] {
        &self.notes[self.notes.len() / 2..]
    }
}
