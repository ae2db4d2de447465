//! Chord accompaniment.
//!
//! The progression is looped for the whole piece, one chord per four
//! beats, and every chord is voiced by the texture named in the
//! parameters. Each texture is a pure function of the same slot.

use cz_ir::{
    Chord, ChordProgression, HarmonyPattern, MusicParameters, NoteEvent, VoiceProfile,
    BASE_FREQUENCY,
};

use crate::melody::BEATS_PER_CHORD;

/// Harmony sits under the melody at this fraction of master volume.
const HARMONY_LEVEL: f32 = 0.4;

/// Stagger between successive tones of a rolled chord, in seconds.
const ROLL_DELAY: f64 = 0.03;

/// Beat multiples of the rhythmic comping figure.
const RHYTHM: [f64; 6] = [1.0, 0.5, 0.5, 1.0, 0.5, 0.5];

/// Generate the harmony layer for one pass.
pub fn generate(params: &MusicParameters, progression: &ChordProgression) -> Vec<NoteEvent> {
    let beat = params.beat_seconds();
    let length = beat * BEATS_PER_CHORD;
    let volume = params.volume * HARMONY_LEVEL;

    let mut events = Vec::new();
    let mut start = 0.0;
    for chord in progression.cycle() {
        if start >= params.duration {
            break;
        }
        let slot = ChordSlot { chord, start, length, beat, volume };
        voice(params.harmony_pattern, &slot, &mut events);
        start += length;
    }
    events
}

/// One chord's span of time and the level it is voiced at.
#[derive(Clone, Copy, Debug)]
pub struct ChordSlot<'a> {
    pub chord: &'a Chord,
    pub start: f64,
    pub length: f64,
    pub beat: f64,
    pub volume: f32,
}

impl ChordSlot<'_> {
    fn end(&self) -> f64 {
        self.start + self.length
    }

    fn tones(&self) -> impl Iterator<Item = f32> + '_ {
        self.chord.frequencies(BASE_FREQUENCY)
    }

    /// All tones struck together at `at`.
    fn strike(&self, at: f64, duration: f64, volume: f32, voice: VoiceProfile, out: &mut Vec<NoteEvent>) {
        out.extend(self.tones().map(|f| NoteEvent::new(f, at, duration, volume, voice)));
    }

    /// Onsets from the chord start, `step` seconds apart, inside the chord.
    fn onsets(&self, step: f64) -> impl Iterator<Item = f64> {
        let (start, end) = (self.start, self.end());
        (0..).map(move |i| start + i as f64 * step).take_while(move |t| *t < end)
    }
}

/// Voice one chord slot with `pattern`.
pub fn voice(pattern: HarmonyPattern, slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    match pattern {
        HarmonyPattern::Block => block(slot, out),
        HarmonyPattern::Arpeggiated => arpeggiated(slot, out),
        HarmonyPattern::Pulsing => pulsing(slot, out),
        HarmonyPattern::Sustained => sustained(slot, out),
        HarmonyPattern::Staccato => staccato(slot, out),
        HarmonyPattern::RollingChord => rolling(slot, out),
        HarmonyPattern::Alternating => alternating(slot, out),
        HarmonyPattern::Tremolo => tremolo(slot, out),
        HarmonyPattern::Pad => pad(slot, out),
        HarmonyPattern::Rhythmic => rhythmic(slot, out),
    }
}

fn block(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    slot.strike(slot.start, slot.length, slot.volume, VoiceProfile::HARMONY, out);
}

fn sustained(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    slot.strike(slot.start, slot.length, slot.volume, VoiceProfile::SUSTAINED, out);
}

fn pad(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    slot.strike(slot.start, slot.length, slot.volume * 0.6, VoiceProfile::PAD, out);
}

/// Chord tones one at a time, every half beat, overlapping slightly.
fn arpeggiated(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    let tones: Vec<f32> = slot.tones().collect();
    for (at, frequency) in slot.onsets(slot.beat * 0.5).zip(tones.iter().cycle()) {
        out.push(NoteEvent::new(*frequency, at, slot.beat * 0.75, slot.volume, VoiceProfile::HARMONY));
    }
}

fn pulsing(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    for at in slot.onsets(slot.beat) {
        slot.strike(at, slot.beat * 0.5, slot.volume, VoiceProfile::HARMONY, out);
    }
}

fn staccato(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    for at in slot.onsets(slot.beat) {
        slot.strike(at, slot.beat * 0.2, slot.volume, VoiceProfile::HARMONY, out);
    }
}

fn tremolo(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    for at in slot.onsets(slot.beat * 0.25) {
        slot.strike(at, slot.beat * 0.15, slot.volume, VoiceProfile::HARMONY, out);
    }
}

/// Tones strummed upward, each entering a little later and ending with
/// the chord.
fn rolling(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    for (i, frequency) in slot.tones().enumerate() {
        let delay = i as f64 * ROLL_DELAY;
        if delay < slot.length {
            out.push(NoteEvent::new(
                frequency,
                slot.start + delay,
                slot.length - delay,
                slot.volume,
                VoiceProfile::HARMONY,
            ));
        }
    }
}

/// Root on even beats, upper tones on odd beats.
fn alternating(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    let duration = slot.beat * 0.75;
    for (i, at) in slot.onsets(slot.beat).enumerate() {
        if i % 2 == 0 {
            let root = slot.chord.root_frequency(BASE_FREQUENCY);
            out.push(NoteEvent::new(root, at, duration, slot.volume, VoiceProfile::HARMONY));
        } else {
            for frequency in slot.tones().skip(1) {
                out.push(NoteEvent::new(frequency, at, duration, slot.volume * 0.8, VoiceProfile::HARMONY));
            }
        }
    }
}

fn rhythmic(slot: &ChordSlot<'_>, out: &mut Vec<NoteEvent>) {
    let mut at = slot.start;
    for step in RHYTHM.iter().cycle().map(|r| r * slot.beat) {
        if at >= slot.end() {
            break;
        }
        slot.strike(at, step * 0.9, slot.volume, VoiceProfile::HARMONY, out);
        at += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cz_ir::Mood;

    fn slot(chord: &Chord) -> ChordSlot<'_> {
        // 120 bpm: half-second beats, two-second chords.
        ChordSlot { chord, start: 2.0, length: 2.0, beat: 0.5, volume: 0.1 }
    }

    fn triad() -> Chord {
        Chord::new(0, &[0, 4, 7]).unwrap()
    }

    fn voiced(pattern: HarmonyPattern) -> Vec<NoteEvent> {
        let chord = triad();
        let mut out = Vec::new();
        voice(pattern, &slot(&chord), &mut out);
        out
    }

    #[test]
    fn every_texture_stays_inside_its_chord() {
        for pattern in HarmonyPattern::ALL {
            let events = voiced(pattern);
            assert!(!events.is_empty(), "{:?}", pattern);
            for e in &events {
                assert!(e.start >= 2.0 && e.start < 4.0, "{:?} starts at {}", pattern, e.start);
                assert!(e.duration > 0.0);
                assert!(e.volume <= 0.1);
            }
        }
    }

    #[test]
    fn block_strikes_all_tones_once() {
        let events = voiced(HarmonyPattern::Block);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.start == 2.0 && e.duration == 2.0));
        assert!((events[0].frequency - BASE_FREQUENCY).abs() < 1e-3);
    }

    #[test]
    fn arpeggio_cycles_tones_every_half_beat() {
        let events = voiced(HarmonyPattern::Arpeggiated);
        assert_eq!(events.len(), 8);
        assert_eq!(events[3].frequency, events[0].frequency);
        assert!((events[1].start - events[0].start - 0.25).abs() < 1e-9);
        assert!((events[0].duration - 0.375).abs() < 1e-9);
    }

    #[test]
    fn pulsing_and_staccato_strike_every_beat() {
        assert_eq!(voiced(HarmonyPattern::Pulsing).len(), 12);
        let staccato = voiced(HarmonyPattern::Staccato);
        assert_eq!(staccato.len(), 12);
        assert!((staccato[0].duration - 0.1).abs() < 1e-9);
    }

    #[test]
    fn tremolo_strikes_every_quarter_beat() {
        assert_eq!(voiced(HarmonyPattern::Tremolo).len(), 16 * 3);
    }

    #[test]
    fn rolled_tones_end_together() {
        let events = voiced(HarmonyPattern::RollingChord);
        assert_eq!(events.len(), 3);
        assert!((events[2].start - 2.06).abs() < 1e-9);
        for e in &events {
            assert!((e.end() - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn alternating_splits_root_and_upper_tones() {
        let events = voiced(HarmonyPattern::Alternating);
        // Four beats: root, two uppers, root, two uppers.
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].volume, 0.1);
        assert!((events[1].volume - 0.08).abs() < 1e-6);
    }

    #[test]
    fn pad_is_quieter_with_its_own_voice() {
        let events = voiced(HarmonyPattern::Pad);
        assert!(events.iter().all(|e| (e.volume - 0.06).abs() < 1e-6 && e.voice == VoiceProfile::PAD));
        assert!(voiced(HarmonyPattern::Sustained).iter().all(|e| e.voice == VoiceProfile::SUSTAINED));
    }

    #[test]
    fn rhythmic_follows_figure() {
        let events = voiced(HarmonyPattern::Rhythmic);
        let onsets: Vec<f64> = events.iter().step_by(3).map(|e| e.start - 2.0).collect();
        let expected = [0.0, 0.5, 0.75, 1.0, 1.5, 1.75];
        assert_eq!(onsets.len(), expected.len());
        for (a, b) in onsets.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn generate_loops_progression_for_duration() {
        let params = MusicParameters { mood: Mood::Sad, duration: 9.0, volume: 0.5, ..Default::default() };
        let progression = ChordProgression::for_mood(Mood::Sad);
        let events = generate(&params, &progression);
        // Chords at 0, 2, 4, 6, 8: five block chords of three tones.
        assert_eq!(events.len(), 15);
        assert!(events.iter().all(|e| (e.volume - 0.2).abs() < 1e-6));
        assert_eq!(events[12].start, 8.0);
        assert_eq!(events[12].frequency, events[0].frequency);
    }
}
