//! Musical parameter sets and timed parameter changes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Overall character of a piece. Drives chord progression, note
/// durations, rest density and melodic range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Mysterious,
    #[default]
    Neutral,
}

/// Scale used for the melodic note table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    #[default]
    Major,
    Minor,
    Pentatonic,
    Blues,
}

/// Motif construction strategy for the melody layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MelodyPattern {
    /// Walks of at most two scale steps.
    Stepwise,
    /// Leaps between chord tones.
    Jumping,
    /// Broken chord, up or down, played twice.
    Arpeggiated,
    /// One note repeated, then a departure.
    Repetitive,
    /// Monotone run up or down the scale.
    ScaleRun,
    /// Chord-tone repetition.
    Syncopated,
    /// Three-note cell transposed upward three times.
    Sequence,
    /// Mix of steps, chord tones and leaps.
    #[default]
    Balanced,
    /// Two or three notes looped.
    Minimal,
    /// Long, fine-grained walk.
    Ornamental,
}

impl MelodyPattern {
    pub const ALL: [MelodyPattern; 10] = [
        MelodyPattern::Stepwise,
        MelodyPattern::Jumping,
        MelodyPattern::Arpeggiated,
        MelodyPattern::Repetitive,
        MelodyPattern::ScaleRun,
        MelodyPattern::Syncopated,
        MelodyPattern::Sequence,
        MelodyPattern::Balanced,
        MelodyPattern::Minimal,
        MelodyPattern::Ornamental,
    ];
}

/// Texture used to voice each chord of the harmony layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmonyPattern {
    #[default]
    Block,
    Arpeggiated,
    Pulsing,
    Sustained,
    Staccato,
    RollingChord,
    Alternating,
    Tremolo,
    Pad,
    Rhythmic,
}

impl HarmonyPattern {
    pub const ALL: [HarmonyPattern; 10] = [
        HarmonyPattern::Block,
        HarmonyPattern::Arpeggiated,
        HarmonyPattern::Pulsing,
        HarmonyPattern::Sustained,
        HarmonyPattern::Staccato,
        HarmonyPattern::RollingChord,
        HarmonyPattern::Alternating,
        HarmonyPattern::Tremolo,
        HarmonyPattern::Pad,
        HarmonyPattern::Rhythmic,
    ];
}

/// One complete set of generation parameters.
///
/// A value type: generators always work on their own copy, so a caller
/// mutating its instance never affects a pass already in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicParameters {
    /// Beats per minute.
    pub tempo: f32,
    pub mood: Mood,
    pub scale: Scale,
    /// Target length in seconds.
    pub duration: f64,
    /// Master volume (0.0..=1.0).
    pub volume: f32,
    pub enable_harmony: bool,
    pub enable_bass: bool,
    pub melody_pattern: MelodyPattern,
    pub harmony_pattern: HarmonyPattern,
}

impl Default for MusicParameters {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            mood: Mood::Neutral,
            scale: Scale::Major,
            duration: 30.0,
            volume: 0.2,
            enable_harmony: true,
            enable_bass: true,
            melody_pattern: MelodyPattern::Balanced,
            harmony_pattern: HarmonyPattern::Block,
        }
    }
}

impl MusicParameters {
    /// Reject values that would make generation ill-defined.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(Error::InvalidDuration(self.duration));
        }
        self.validate_sound()
    }

    /// Check tempo and volume only. Scheduled changes take their length
    /// from the schedule, so their own `duration` is never read.
    pub fn validate_sound(&self) -> Result<()> {
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(Error::InvalidTempo(self.tempo));
        }
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(Error::InvalidVolume(self.volume));
        }
        Ok(())
    }

    /// Length of one beat in seconds.
    pub fn beat_seconds(&self) -> f64 {
        60.0 / self.tempo as f64
    }

    /// Copy of these parameters with a different duration.
    pub fn with_duration(&self, duration: f64) -> Self {
        Self { duration, ..self.clone() }
    }
}

/// A scheduled switch to a new parameter set during an offline render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    /// Seconds from the start of the piece.
    pub time_offset: f64,
    pub parameters: MusicParameters,
    /// Crossfade length in seconds.
    #[serde(default = "default_transition")]
    pub transition: f64,
}

fn default_transition() -> f64 {
    2.0
}

impl ParameterChange {
    pub fn new(time_offset: f64, parameters: MusicParameters, transition: f64) -> Self {
        Self { time_offset, parameters, transition }
    }
}

/// Validate a change list and return it sorted by time offset.
///
/// The sort is stable, so changes sharing an offset keep their given order.
pub fn sorted_changes(changes: &[ParameterChange]) -> Result<Vec<ParameterChange>> {
    for (index, change) in changes.iter().enumerate() {
        if !change.time_offset.is_finite() || change.time_offset < 0.0 {
            return Err(Error::InvalidChange {
                index,
                reason: format!("time offset {} is not a non-negative time", change.time_offset),
            });
        }
        if !change.transition.is_finite() || change.transition < 0.0 {
            return Err(Error::InvalidChange {
                index,
                reason: format!("transition {} is not a non-negative duration", change.transition),
            });
        }
        if let Err(e) = change.parameters.validate_sound() {
            return Err(Error::InvalidChange { index, reason: e.to_string() });
        }
    }
    let mut sorted = changes.to_vec();
    sorted.sort_by(|a, b| a.time_offset.total_cmp(&b.time_offset));
    Ok(sorted)
}

/// Named parameter sets for quick auditioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    Happy,
    Sad,
    Calm,
    Energetic,
    Minimal,
    Rhythmic,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Happy,
        Preset::Sad,
        Preset::Calm,
        Preset::Energetic,
        Preset::Minimal,
        Preset::Rhythmic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Happy => "happy",
            Preset::Sad => "sad",
            Preset::Calm => "calm",
            Preset::Energetic => "energetic",
            Preset::Minimal => "minimal",
            Preset::Rhythmic => "rhythmic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn parameters(self) -> MusicParameters {
        let base = MusicParameters { volume: 0.1, ..MusicParameters::default() };
        match self {
            Preset::Happy => MusicParameters {
                tempo: 130.0,
                mood: Mood::Happy,
                melody_pattern: MelodyPattern::Balanced,
                harmony_pattern: HarmonyPattern::Arpeggiated,
                ..base
            },
            Preset::Sad => MusicParameters {
                tempo: 75.0,
                mood: Mood::Sad,
                scale: Scale::Minor,
                melody_pattern: MelodyPattern::Stepwise,
                harmony_pattern: HarmonyPattern::Pad,
                ..base
            },
            Preset::Calm => MusicParameters {
                tempo: 60.0,
                mood: Mood::Calm,
                scale: Scale::Pentatonic,
                enable_bass: false,
                melody_pattern: MelodyPattern::Arpeggiated,
                harmony_pattern: HarmonyPattern::Sustained,
                ..base
            },
            Preset::Energetic => MusicParameters {
                tempo: 150.0,
                mood: Mood::Energetic,
                melody_pattern: MelodyPattern::Jumping,
                harmony_pattern: HarmonyPattern::Pulsing,
                ..base
            },
            Preset::Minimal => MusicParameters {
                tempo: 90.0,
                mood: Mood::Mysterious,
                scale: Scale::Minor,
                melody_pattern: MelodyPattern::Minimal,
                harmony_pattern: HarmonyPattern::Tremolo,
                ..base
            },
            Preset::Rhythmic => MusicParameters {
                tempo: 120.0,
                mood: Mood::Happy,
                melody_pattern: MelodyPattern::Syncopated,
                harmony_pattern: HarmonyPattern::Rhythmic,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert_eq!(MusicParameters::default().validate(), Ok(()));
    }

    #[test]
    fn non_positive_tempo_rejected() {
        let p = MusicParameters { tempo: 0.0, ..Default::default() };
        assert_eq!(p.validate(), Err(Error::InvalidTempo(0.0)));
        let p = MusicParameters { tempo: -10.0, ..Default::default() };
        assert!(p.validate().is_err());
        let p = MusicParameters { tempo: f32::NAN, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_positive_duration_rejected() {
        let p = MusicParameters { duration: 0.0, ..Default::default() };
        assert_eq!(p.validate(), Err(Error::InvalidDuration(0.0)));
    }

    #[test]
    fn volume_outside_unit_range_rejected() {
        let p = MusicParameters { volume: 1.5, ..Default::default() };
        assert_eq!(p.validate(), Err(Error::InvalidVolume(1.5)));
        let p = MusicParameters { volume: -0.1, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn beat_seconds_at_120_bpm() {
        let p = MusicParameters { tempo: 120.0, ..Default::default() };
        assert!((p.beat_seconds() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sorted_changes_orders_by_offset() {
        let p = MusicParameters::default();
        let changes = vec![
            ParameterChange::new(8.0, p.clone(), 1.0),
            ParameterChange::new(2.0, p.clone(), 1.0),
            ParameterChange::new(5.0, p.clone(), 0.0),
        ];
        let sorted = sorted_changes(&changes).unwrap();
        let offsets: Vec<f64> = sorted.iter().map(|c| c.time_offset).collect();
        assert_eq!(offsets, vec![2.0, 5.0, 8.0]);
    }

    #[test]
    fn negative_transition_rejected() {
        let changes = vec![ParameterChange::new(1.0, MusicParameters::default(), -1.0)];
        assert!(matches!(
            sorted_changes(&changes),
            Err(Error::InvalidChange { index: 0, .. })
        ));
    }

    #[test]
    fn change_duration_is_not_checked() {
        let json = r#"[{"time_offset": 1.0, "parameters": {"duration": 0.0, "tempo": 90.0}}]"#;
        let changes: Vec<ParameterChange> = serde_json::from_str(json).unwrap();
        assert_eq!(sorted_changes(&changes).unwrap().len(), 1);

        let bad_tempo = vec![ParameterChange::new(1.0, MusicParameters { tempo: 0.0, ..Default::default() }, 1.0)];
        assert!(sorted_changes(&bad_tempo).is_err());
    }

    #[test]
    fn change_with_bad_parameters_rejected() {
        let bad = MusicParameters { tempo: 0.0, ..Default::default() };
        let changes = vec![
            ParameterChange::new(1.0, MusicParameters::default(), 1.0),
            ParameterChange::new(2.0, bad, 1.0),
        ];
        assert!(matches!(
            sorted_changes(&changes),
            Err(Error::InvalidChange { index: 1, .. })
        ));
    }

    #[test]
    fn presets_are_valid_and_named() {
        for preset in Preset::ALL {
            assert_eq!(preset.parameters().validate(), Ok(()));
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("SAD"), Some(Preset::Sad));
        assert_eq!(Preset::from_name("loud"), None);
    }

    #[test]
    fn parameters_deserialize_with_defaults() {
        let p: MusicParameters =
            serde_json::from_str(r#"{"tempo": 90.0, "mood": "Calm"}"#).unwrap();
        assert_eq!(p.tempo, 90.0);
        assert_eq!(p.mood, Mood::Calm);
        assert_eq!(p.scale, Scale::Major);
        assert!(p.enable_harmony);
    }

    #[test]
    fn change_transition_defaults_to_two_seconds() {
        let c: ParameterChange =
            serde_json::from_str(r#"{"time_offset": 4.0, "parameters": {}}"#).unwrap();
        assert_eq!(c.transition, 2.0);
        assert_eq!(c.parameters, MusicParameters::default());
    }
}
