//! Integration test: parameters → controller → rendered buffer → verify output.

use cz_ir::{HarmonyPattern, MelodyPattern, Mood, Scale, LIMITER_THRESHOLD};
use cz_master::{Controller, LiveConfig, MusicParameters, ParameterChange, Preset, RenderConfig};

fn controller(seed: u64, sample_rate: u32) -> Controller {
    Controller::new(RenderConfig::seeded(seed).with_sample_rate(sample_rate), LiveConfig::default()).unwrap()
}

fn max_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

fn rms(samples: &[f32]) -> f32 {
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

#[test]
fn happy_four_seconds_at_cd_rate() {
    let params = MusicParameters {
        tempo: 120.0,
        mood: Mood::Happy,
        scale: Scale::Major,
        duration: 4.0,
        volume: 0.2,
        enable_harmony: true,
        enable_bass: true,
        ..Default::default()
    };
    let mut ctrl = controller(2024, 44_100);
    let out = ctrl.render_to_buffer(&params).unwrap();
    assert_eq!(out.len(), 176_400);
    assert!(max_amplitude(&out) <= 0.95);
    assert!(max_amplitude(&out) > 0.01, "Expected audible output");
}

#[test]
fn length_is_exact_for_any_duration() {
    let mut ctrl = controller(1, 22_050);
    for duration in [0.5, 1.0, 2.25, 3.7] {
        let params = MusicParameters { duration, ..Default::default() };
        let out = ctrl.render_to_buffer(&params).unwrap();
        assert_eq!(out.len(), (duration * 22_050.0_f64).round() as usize, "duration {}", duration);
    }
}

#[test]
fn every_preset_renders_within_limits() {
    let mut ctrl = controller(3, 16_000);
    for preset in Preset::ALL {
        let params = preset.parameters().with_duration(3.0);
        let out = ctrl.render_to_buffer(&params).unwrap();
        assert_eq!(out.len(), 48_000);
        assert!(out.iter().all(|s| s.is_finite()), "{:?} produced non-finite samples", preset);
        assert!(max_amplitude(&out) <= LIMITER_THRESHOLD);
        assert!(rms(&out) > 0.001, "{:?} is silent", preset);
    }
}

#[test]
fn every_pattern_pair_renders() {
    let mut ctrl = controller(4, 8_000);
    for (melody, harmony) in MelodyPattern::ALL.iter().zip(HarmonyPattern::ALL.iter()) {
        let params = MusicParameters {
            melody_pattern: *melody,
            harmony_pattern: *harmony,
            duration: 2.0,
            volume: 1.0,
            ..Default::default()
        };
        let out = ctrl.render_to_buffer(&params).unwrap();
        assert_eq!(out.len(), 16_000);
        assert!(max_amplitude(&out) <= LIMITER_THRESHOLD, "{:?}/{:?}", melody, harmony);
    }
}

#[test]
fn loud_mix_is_limited_not_clipped() {
    // Full volume with all layers sums well past unity before limiting.
    let params = MusicParameters {
        volume: 1.0,
        harmony_pattern: HarmonyPattern::Tremolo,
        duration: 2.0,
        ..Default::default()
    };
    let out = controller(5, 8_000).render_to_buffer(&params).unwrap();
    let peak = max_amplitude(&out);
    assert!(peak <= LIMITER_THRESHOLD);
    assert!(peak > 0.5);
}

#[test]
fn same_seed_renders_identically() {
    let params = Preset::Rhythmic.parameters().with_duration(3.0);
    let a = controller(77, 8_000).render_to_buffer(&params).unwrap();
    let b = controller(77, 8_000).render_to_buffer(&params).unwrap();
    assert_eq!(a, b);
    let c = controller(78, 8_000).render_to_buffer(&params).unwrap();
    assert_ne!(a, c);
}

#[test]
fn disabling_layers_thins_the_mix() {
    let full = MusicParameters { duration: 2.0, ..Default::default() };
    let melody_only = MusicParameters { enable_harmony: false, enable_bass: false, ..full.clone() };
    let a = controller(6, 8_000).render_to_buffer(&full).unwrap();
    let b = controller(6, 8_000).render_to_buffer(&melody_only).unwrap();
    assert!(rms(&b) < rms(&a));
}

#[test]
fn invalid_parameters_are_rejected_before_rendering() {
    let mut ctrl = controller(7, 8_000);
    for params in [
        MusicParameters { tempo: 0.0, ..Default::default() },
        MusicParameters { tempo: f32::NAN, ..Default::default() },
        MusicParameters { duration: 0.0, ..Default::default() },
        MusicParameters { volume: -0.1, ..Default::default() },
    ] {
        assert!(ctrl.render_to_buffer(&params).is_err(), "{:?}", params);
    }
}

// --- change schedules ---

#[test]
fn schedule_renders_full_length_in_any_order() {
    let params = MusicParameters { duration: 8.0, ..Default::default() };
    let changes = vec![
        ParameterChange::new(5.0, Preset::Energetic.parameters(), 1.0),
        ParameterChange::new(2.0, Preset::Sad.parameters(), 2.0),
    ];
    let mut ctrl = controller(8, 8_000);
    let out = ctrl.render_with_changes(&params, &changes).unwrap();
    assert_eq!(out.len(), 64_000);
    assert!(max_amplitude(&out) <= LIMITER_THRESHOLD);
    assert!(out.iter().all(|s| s.is_finite()));

    let mut reversed = changes.clone();
    reversed.reverse();
    let again = controller(8, 8_000).render_with_changes(&params, &reversed).unwrap();
    assert_eq!(out, again);
}

#[test]
fn schedule_section_starts_after_silence_free_bridge() {
    // Bridge covers 2..4 s; every quarter of it carries at least one tone.
    let params = MusicParameters { duration: 6.0, volume: 0.5, ..Default::default() };
    let changes = [ParameterChange::new(2.0, MusicParameters { volume: 0.5, ..Default::default() }, 2.0)];
    let out = controller(9, 8_000).render_with_changes(&params, &changes).unwrap();
    for quarter in 0..4 {
        let start = 16_000 + quarter * 4_000;
        assert!(rms(&out[start + 500..start + 3_500]) > 0.0);
    }
}

#[test]
fn section_after_change_uses_new_parameters() {
    // Cut to silence at 2 s with no bridge; tails of earlier notes ring out
    // by 3.5 s, after which only the muted section remains.
    let params = MusicParameters { duration: 5.0, volume: 0.5, ..Default::default() };
    let changes = [ParameterChange::new(2.0, MusicParameters { volume: 0.0, ..Default::default() }, 0.0)];
    let out = controller(13, 8_000).render_with_changes(&params, &changes).unwrap();
    assert_eq!(out.len(), 40_000);
    assert!(max_amplitude(&out[..16_000]) > 0.01);
    assert!(out[28_000..].iter().all(|&s| s == 0.0));
}

#[test]
fn schedule_with_bad_entry_is_rejected() {
    let params = MusicParameters { duration: 4.0, ..Default::default() };
    let changes = [
        ParameterChange::new(1.0, MusicParameters::default(), 1.0),
        ParameterChange::new(2.0, MusicParameters::default(), -1.0),
    ];
    let err = controller(10, 8_000).render_with_changes(&params, &changes).unwrap_err();
    assert!(err.to_string().contains("change #1"), "{}", err);
}

#[test]
fn schedule_loads_from_json() {
    let json = r#"[
        {"time_offset": 1.0, "parameters": {"tempo": 90.0, "mood": "Calm"}, "transition": 0.5},
        {"time_offset": 2.5, "parameters": {"mood": "Energetic", "harmony_pattern": "Staccato"}}
    ]"#;
    let changes: Vec<ParameterChange> = serde_json::from_str(json).unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].parameters.tempo, 90.0);
    assert_eq!(changes[0].parameters.volume, MusicParameters::default().volume);
    assert_eq!(changes[1].transition, 2.0);

    let params = MusicParameters { duration: 4.0, ..Default::default() };
    let out = controller(11, 8_000).render_with_changes(&params, &changes).unwrap();
    assert_eq!(out.len(), 32_000);
}

#[test]
fn wav_export_matches_render() {
    let params = Preset::Minimal.parameters().with_duration(1.0);
    let mut ctrl = controller(12, 8_000);
    let wav = ctrl.render_to_wav(&params, &[]).unwrap();
    let samples = controller(12, 8_000).render_to_buffer(&params).unwrap();
    assert_eq!(wav.len(), 44 + samples.len() * 2);
    for (i, &s) in samples.iter().enumerate().step_by(97) {
        let at = 44 + i * 2;
        assert_eq!(i16::from_le_bytes([wav[at], wav[at + 1]]), cz_master::to_pcm16(s));
    }
}
