//! Headless controller for cadenza.
//!
//! Provides one API for offline renders, a live session and WAV export
//! that the CLI and any embedding host can share.

mod error;
mod wav;

use cz_engine::Renderer;
use cz_live::LiveStream;
use tracing::info;

// Re-export common types so callers don't need cz-ir/cz-engine/cz-live directly.
pub use cz_engine::RenderConfig;
pub use cz_ir::{MusicParameters, ParameterChange, Preset};
pub use cz_live::{LiveConfig, LiveError};

pub use error::{Error, Result};
pub use wav::{samples_to_wav, to_pcm16, write_wav};

/// Headless controller: owns the offline renderer and at most one live
/// stream.
pub struct Controller {
    renderer: Renderer,
    live_config: LiveConfig,
    live: Option<LiveStream>,
}

impl Controller {
    pub fn new(render: RenderConfig, live: LiveConfig) -> Result<Self> {
        Ok(Self { renderer: Renderer::new(render)?, live_config: live, live: None })
    }

    pub fn sample_rate(&self) -> u32 {
        self.renderer.sample_rate()
    }

    // --- Offline rendering ---

    pub fn render_to_buffer(&mut self, params: &MusicParameters) -> Result<Vec<f32>> {
        Ok(self.renderer.render(params)?)
    }

    pub fn render_with_changes(
        &mut self,
        params: &MusicParameters,
        changes: &[ParameterChange],
    ) -> Result<Vec<f32>> {
        Ok(self.renderer.render_with_changes(params, changes)?)
    }

    /// Render (with an optional change schedule) straight to WAV bytes.
    pub fn render_to_wav(&mut self, params: &MusicParameters, changes: &[ParameterChange]) -> Result<Vec<u8>> {
        let samples = self.render_with_changes(params, changes)?;
        Ok(wav::samples_to_wav(&samples, self.sample_rate()))
    }

    // --- Live session ---

    /// Start a live stream for `params`, replacing any running one.
    pub fn start_live(&mut self, params: MusicParameters) -> Result<()> {
        self.stop_live()?;
        let mut stream = LiveStream::new(params, self.live_config)?;
        stream.start()?;
        self.live = Some(stream);
        Ok(())
    }

    pub fn update_live(&self, params: MusicParameters, transition_seconds: f64) -> Result<()> {
        let stream = self.live.as_ref().ok_or(Error::NotLive)?;
        stream.update_parameters(params, transition_seconds)?;
        Ok(())
    }

    /// Stop the live stream, if any. The stream is released even when its
    /// thread misses the stop timeout.
    pub fn stop_live(&mut self) -> Result<()> {
        if let Some(mut stream) = self.live.take() {
            stream.stop()?;
            info!(seconds = stream.current_time_seconds(), "live session ended");
        }
        Ok(())
    }

    /// Pull `count` samples from the live stream; silence when not live.
    pub fn read(&mut self, count: usize) -> Vec<f32> {
        match self.live.as_mut() {
            Some(stream) => stream.read(count),
            None => vec![0.0; count],
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.as_ref().is_some_and(|s| s.is_running())
    }

    pub fn live(&self) -> Option<&LiveStream> {
        self.live.as_ref()
    }

    pub fn live_mut(&mut self) -> Option<&mut LiveStream> {
        self.live.as_mut()
    }
}
