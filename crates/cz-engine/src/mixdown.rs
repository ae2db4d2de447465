//! Offline rendering: layer generation, synthesis and mixdown.
//!
//! A render lays the melody, harmony and bass layers out as note events,
//! synthesizes each layer into its own buffer, pads every buffer to the
//! requested length and sums them through the soft limiter. With a change
//! schedule, the piece is cut into sections rendered independently and
//! offset into place, with short bridging tones across each change.

use cz_ir::{
    sorted_changes, ChordProgression, MusicParameters, NoteEvent, ParameterChange, Result,
    ScaleNoteTable, VoiceProfile, LIMITER_THRESHOLD,
};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{seeded_rng, RenderConfig};
use crate::shaping::{delay, limit, mix_into, mix_layers, pad_to};
use crate::tone::{render_note, samples_for};
use crate::{bass, harmony, melody};

/// Bridging tone for the outgoing section.
pub const TRANSITION_FROM_FREQUENCY: f32 = 440.0;
/// Bridging tone for the incoming section.
pub const TRANSITION_TO_FREQUENCY: f32 = 523.25;
/// Number of equal steps in a transition bridge.
pub const TRANSITION_STEPS: usize = 4;
/// Bridging tones at or below this volume are skipped.
const TRANSITION_MIN_VOLUME: f32 = 0.01;

/// Note events of one generation pass, by layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arrangement {
    pub melody: Vec<NoteEvent>,
    pub harmony: Vec<NoteEvent>,
    pub bass: Vec<NoteEvent>,
}

impl Arrangement {
    pub fn layers(&self) -> [&[NoteEvent]; 3] {
        [&self.melody, &self.harmony, &self.bass]
    }

    pub fn note_count(&self) -> usize {
        self.melody.len() + self.harmony.len() + self.bass.len()
    }
}

/// Offline renderer. Owns the random source, so successive renders from
/// one renderer differ while two renderers with the same seed agree.
pub struct Renderer {
    sample_rate: u32,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.resolve_seed();
        debug!(seed, sample_rate = config.sample_rate, "renderer created");
        Ok(Self { sample_rate: config.sample_rate, seed, rng: seeded_rng(seed) })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seed this renderer was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Lay out the note events for one pass over `params`. Layers that are
    /// switched off come back empty.
    pub fn arrange(&mut self, params: &MusicParameters) -> Arrangement {
        let table = ScaleNoteTable::new(params.scale, params.mood);
        let progression = ChordProgression::for_mood(params.mood);

        let arrangement = Arrangement {
            melody: melody::generate(params, &table, &progression, &mut self.rng),
            harmony: if params.enable_harmony {
                harmony::generate(params, &progression)
            } else {
                Vec::new()
            },
            bass: if params.enable_bass { bass::generate(params, &progression) } else { Vec::new() },
        };
        debug!(
            melody = arrangement.melody.len(),
            harmony = arrangement.harmony.len(),
            bass = arrangement.bass.len(),
            "arranged"
        );
        arrangement
    }

    /// Render `params.duration` seconds of mono audio.
    ///
    /// The result holds exactly `round(duration * sample_rate)` samples,
    /// each within the limiter threshold.
    pub fn render(&mut self, params: &MusicParameters) -> Result<Vec<f32>> {
        params.validate()?;
        let total = samples_for(params.duration, self.sample_rate);
        let arrangement = self.arrange(params);

        let mut layers: Vec<Vec<f32>> = arrangement
            .layers()
            .iter()
            .filter(|events| !events.is_empty())
            .map(|events| render_layer(events, self.sample_rate))
            .collect();
        let out = finish(&mut layers, total);
        info!(samples = out.len(), notes = arrangement.note_count(), "rendered");
        Ok(out)
    }

    /// Render `params.duration` seconds, switching parameters at each
    /// scheduled change.
    ///
    /// Each section is rendered from its own time zero and offset to where
    /// it starts. A change with a non-zero transition inserts a bridge of
    /// reference tones fading from the old volume to the new one; the next
    /// section starts once the bridge ends. An empty schedule is the same
    /// as [`Renderer::render`].
    pub fn render_with_changes(
        &mut self,
        params: &MusicParameters,
        changes: &[ParameterChange],
    ) -> Result<Vec<f32>> {
        params.validate()?;
        if changes.is_empty() {
            return self.render(params);
        }
        let changes = sorted_changes(changes)?;
        let length = params.duration;
        let total = samples_for(length, self.sample_rate);

        let mut layers = Vec::new();
        let mut current = params.clone();
        let mut time = 0.0;

        for change in &changes {
            let section_end = change.time_offset.min(length);
            if section_end > time {
                layers.push(self.render_section(&current.with_duration(section_end - time), time));
            }

            let bridge_end = (change.time_offset + change.transition).min(length);
            if bridge_end > change.time_offset {
                layers.push(self.render_bridge(
                    &current,
                    &change.parameters,
                    change.time_offset,
                    bridge_end - change.time_offset,
                ));
            }

            time = time.max(bridge_end);
            current = change.parameters.clone();
        }

        if time < length {
            layers.push(self.render_section(&current.with_duration(length - time), time));
        }

        let out = finish(&mut layers, total);
        info!(samples = out.len(), changes = changes.len(), sections = layers.len(), "rendered with changes");
        Ok(out)
    }

    /// All layers of one section, summed and delayed to `offset` seconds.
    fn render_section(&mut self, params: &MusicParameters, offset: f64) -> Vec<f32> {
        debug!(offset, duration = params.duration, mood = ?params.mood, "section");
        let arrangement = self.arrange(params);
        let mut section = Vec::new();
        for events in arrangement.layers() {
            mix_into(&mut section, &render_layer(events, self.sample_rate), 0);
        }
        delay(&section, samples_for(offset, self.sample_rate))
    }

    /// Reference tones bridging `from` into `to` over `duration` seconds
    /// starting at `offset`.
    fn render_bridge(
        &self,
        from: &MusicParameters,
        to: &MusicParameters,
        offset: f64,
        duration: f64,
    ) -> Vec<f32> {
        debug!(offset, duration, "transition");
        let events = bridge_events(from.volume, to.volume, duration);
        delay(&render_layer(&events, self.sample_rate), samples_for(offset, self.sample_rate))
    }
}

/// Note events of a transition bridge, relative to its start.
///
/// The window is split into equal steps. At step `i` of `n` the outgoing
/// tone plays at `from_volume * (1 - i/n)` and the incoming one at
/// `to_volume * i/n`; near-silent tones are left out.
pub fn bridge_events(from_volume: f32, to_volume: f32, duration: f64) -> Vec<NoteEvent> {
    let step = duration / TRANSITION_STEPS as f64;
    let mut events = Vec::new();
    for i in 0..TRANSITION_STEPS {
        let t = i as f32 / TRANSITION_STEPS as f32;
        let start = i as f64 * step;
        for (frequency, volume) in [
            (TRANSITION_FROM_FREQUENCY, from_volume * (1.0 - t)),
            (TRANSITION_TO_FREQUENCY, to_volume * t),
        ] {
            if volume > TRANSITION_MIN_VOLUME {
                events.push(NoteEvent::new(frequency, start, step, volume, VoiceProfile::TRANSITION));
            }
        }
    }
    events
}

/// Synthesize a list of note events into one buffer, each note placed at
/// its start offset. The buffer ends with the last note to finish.
pub fn render_layer(events: &[NoteEvent], sample_rate: u32) -> Vec<f32> {
    let mut out = Vec::new();
    for event in events {
        mix_into(&mut out, &render_note(event, sample_rate), samples_for(event.start, sample_rate));
    }
    out
}

/// Pad every layer to `total` samples, sum and limit.
fn finish(layers: &mut [Vec<f32>], total: usize) -> Vec<f32> {
    for layer in layers.iter_mut() {
        pad_to(layer, total);
    }
    let mut out = mix_layers(layers, total);
    limit(&mut out, LIMITER_THRESHOLD);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cz_ir::{HarmonyPattern, Mood, Preset};

    const SR: u32 = 8_000;

    fn renderer(seed: u64) -> Renderer {
        Renderer::new(RenderConfig::seeded(seed).with_sample_rate(SR)).unwrap()
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn render_has_exact_length_and_is_limited() {
        let params = MusicParameters { duration: 3.0, volume: 1.0, ..Default::default() };
        let out = renderer(1).render(&params).unwrap();
        assert_eq!(out.len(), 24_000);
        assert!(peak(&out) <= LIMITER_THRESHOLD);
        assert!(peak(&out) > 0.1);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn layer_switches_drop_layers() {
        let params = MusicParameters { enable_harmony: false, enable_bass: false, ..Default::default() };
        let arrangement = renderer(2).arrange(&params);
        assert!(!arrangement.melody.is_empty());
        assert!(arrangement.harmony.is_empty());
        assert!(arrangement.bass.is_empty());
    }

    #[test]
    fn same_seed_same_audio() {
        let params = Preset::Calm.parameters().with_duration(2.0);
        let a = renderer(42).render(&params).unwrap();
        let b = renderer(42).render(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let params = MusicParameters { tempo: 0.0, ..Default::default() };
        assert!(renderer(0).render(&params).is_err());
        let params = MusicParameters { duration: -1.0, ..Default::default() };
        assert!(renderer(0).render_with_changes(&params, &[]).is_err());
    }

    #[test]
    fn zero_sample_rate_rejected() {
        assert!(Renderer::new(RenderConfig::default().with_sample_rate(0)).is_err());
    }

    #[test]
    fn empty_schedule_matches_plain_render() {
        let params = MusicParameters { duration: 2.0, ..Default::default() };
        let a = renderer(5).render(&params).unwrap();
        let b = renderer(5).render_with_changes(&params, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bridge_fades_between_volumes() {
        let events = bridge_events(0.4, 0.8, 2.0);
        // Step 0 has no incoming tone; steps 1..3 have both.
        assert_eq!(events.len(), 7);
        assert_eq!(events[0].frequency, TRANSITION_FROM_FREQUENCY);
        assert!((events[0].volume - 0.4).abs() < 1e-6);
        assert!(events.iter().all(|e| e.duration == 0.5 && e.voice == VoiceProfile::TRANSITION));
        let last_in = events.iter().rev().find(|e| e.frequency == TRANSITION_TO_FREQUENCY).unwrap();
        assert!((last_in.volume - 0.6).abs() < 1e-6);
        assert_eq!(last_in.start, 1.5);
    }

    #[test]
    fn bridge_skips_quiet_tones() {
        let events = bridge_events(0.0, 0.0, 1.0);
        assert!(events.is_empty());
    }

    #[test]
    fn changes_render_full_length() {
        let params = MusicParameters { duration: 6.0, ..Default::default() };
        let later = MusicParameters {
            mood: Mood::Energetic,
            tempo: 160.0,
            harmony_pattern: HarmonyPattern::Staccato,
            ..Default::default()
        };
        let changes = [ParameterChange::new(2.0, later, 1.0)];
        let out = renderer(9).render_with_changes(&params, &changes).unwrap();
        assert_eq!(out.len(), 48_000);
        assert!(peak(&out) <= LIMITER_THRESHOLD);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn change_past_end_is_harmless() {
        let params = MusicParameters { duration: 1.0, ..Default::default() };
        let changes = [ParameterChange::new(5.0, Preset::Sad.parameters(), 2.0)];
        let out = renderer(3).render_with_changes(&params, &changes).unwrap();
        assert_eq!(out.len(), 8_000);
    }

    #[test]
    fn invalid_change_rejected() {
        let params = MusicParameters { duration: 1.0, ..Default::default() };
        let changes = [ParameterChange::new(f64::NAN, MusicParameters::default(), 1.0)];
        assert!(renderer(3).render_with_changes(&params, &changes).is_err());
    }

    #[test]
    fn layer_places_notes_at_start() {
        let events = [NoteEvent::new(440.0, 0.5, 0.25, 0.5, VoiceProfile::MELODY)];
        let out = render_layer(&events, SR);
        assert_eq!(out.len(), 6_000);
        assert!(out[..4_000].iter().all(|&s| s == 0.0));
        assert!(peak(&out[4_000..]) > 0.0);
    }
}
