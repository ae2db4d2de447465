//! Core types for the cadenza music generator.
//!
//! This crate defines the values every other crate passes around:
//! parameter sets and scheduled changes, chord and scale tables, note
//! events and the envelope shapes used to voice them. Generators emit
//! these types; the mixdown and live engines consume them.

mod envelope;
mod error;
mod note;
mod parameters;
mod theory;

pub use envelope::{interpolate, Adsr, CurveKind, EnvelopeLayout, VoiceProfile};
pub use error::{Error, Result};
pub use note::{Motif, NoteEvent};
pub use parameters::{
    sorted_changes, HarmonyPattern, MelodyPattern, Mood, MusicParameters, ParameterChange, Preset,
    Scale,
};
pub use theory::{
    semitone_ratio, shift_frequency, Chord, ChordProgression, ScaleNoteTable, BASE_FREQUENCY,
    BASS_BASE_FREQUENCY, MAX_CHORD_TONES, PROGRESSION_LENGTH,
};

/// Default output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Peak level the soft limiter keeps every output sample under.
pub const LIMITER_THRESHOLD: f32 = 0.95;
