//! Parameter transitions for the live stream.
//!
//! A transition moves from the current parameter set to a target over a
//! fixed time. Tempo and volume glide; the discrete fields switch at the
//! halfway point; the layer switches follow the target immediately.

use cz_ir::MusicParameters;

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    current: MusicParameters,
    target: Option<MusicParameters>,
    progress: f64,
    duration: f64,
}

impl Transition {
    pub fn new(params: MusicParameters) -> Self {
        Self { current: params, target: None, progress: 0.0, duration: 0.0 }
    }

    /// Begin moving toward `target` over `seconds`. Replaces any transition
    /// in flight; progress restarts from zero.
    pub fn update(&mut self, target: MusicParameters, seconds: f64) {
        self.target = Some(target);
        self.duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.progress = 0.0;
    }

    /// Add `dt` seconds of progress. Returns true when this call committed
    /// the target as the new current set.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.progress += dt;
        if self.progress >= self.duration {
            if let Some(target) = self.target.take() {
                self.current = target;
            }
            self.progress = 0.0;
            return true;
        }
        false
    }

    pub fn is_transitioning(&self) -> bool {
        self.target.is_some()
    }

    pub fn current(&self) -> &MusicParameters {
        &self.current
    }

    pub fn target(&self) -> Option<&MusicParameters> {
        self.target.as_ref()
    }

    /// Seconds of progress into the running transition.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Completed fraction of the running transition, 0.0..=1.0.
    pub fn fraction(&self) -> f64 {
        match self.target {
            None => 1.0,
            Some(_) if self.duration <= 0.0 => 1.0,
            Some(_) => (self.progress / self.duration).clamp(0.0, 1.0),
        }
    }

    /// The parameter set generation should use right now.
    pub fn effective(&self) -> MusicParameters {
        let Some(target) = &self.target else {
            return self.current.clone();
        };
        let t = self.fraction();
        let current = &self.current;
        let switched = if t >= 0.5 { target } else { current };
        MusicParameters {
            tempo: lerp(current.tempo, target.tempo, t as f32),
            volume: lerp(current.volume, target.volume, t as f32),
            mood: switched.mood,
            scale: switched.scale,
            melody_pattern: switched.melody_pattern,
            harmony_pattern: switched.harmony_pattern,
            enable_harmony: target.enable_harmony,
            enable_bass: target.enable_bass,
            duration: current.duration,
        }
    }
}

/// Exact at both ends: `t = 0` gives `a`, `t = 1` gives `b`.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
