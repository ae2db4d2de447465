//! Note events and melodic motifs.

use crate::envelope::VoiceProfile;

/// One timed note, the unit every layer generator emits.
///
/// Events may overlap freely; mixdown sums them as they are.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    /// Pitch in Hz.
    pub frequency: f32,
    /// Seconds from the start of the layer.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
    /// Peak amplitude before the voice profile gain.
    pub volume: f32,
    pub voice: VoiceProfile,
}

impl NoteEvent {
    pub fn new(frequency: f32, start: f64, duration: f64, volume: f32, voice: VoiceProfile) -> Self {
        Self { frequency, start, duration, volume, voice }
    }

    /// Seconds at which the note stops sounding.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A short melodic fragment: an ordered, non-empty list of frequencies.
///
/// Built once per generation pass and only read afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Motif {
    notes: Vec<f32>,
}

impl Motif {
    /// Wrap a note list, returning `None` when it is empty.
    pub fn new(notes: Vec<f32>) -> Option<Self> {
        if notes.is_empty() {
            None
        } else {
            Some(Self { notes })
        }
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

    pub fn first(&self) -> f32 {
        self.notes[0]
    }
}
