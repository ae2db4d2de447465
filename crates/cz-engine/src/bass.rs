//! Bass line: the chord root an octave down, pulsed twice per chord.

use cz_ir::{ChordProgression, MusicParameters, NoteEvent, VoiceProfile, BASS_BASE_FREQUENCY};

use crate::melody::BEATS_PER_CHORD;

const BASS_LEVEL: f32 = 0.5;
const PULSES_PER_CHORD: usize = 2;
const PULSE_BEATS: f64 = 1.5;

/// Generate the bass layer for one pass.
pub fn generate(params: &MusicParameters, progression: &ChordProgression) -> Vec<NoteEvent> {
    let beat = params.beat_seconds();
    let spacing = beat * BEATS_PER_CHORD / PULSES_PER_CHORD as f64;
    let volume = params.volume * BASS_LEVEL;

    let mut events = Vec::new();
    let mut time = 0.0;
    'chords: for chord in progression.cycle() {
        let root = chord.root_frequency(BASS_BASE_FREQUENCY);
        for _ in 0..PULSES_PER_CHORD {
            if time >= params.duration {
                break 'chords;
            }
            events.push(NoteEvent::new(root, time, beat * PULSE_BEATS, volume, VoiceProfile::BASS));
            time += spacing;
        }
    }
    events
}
