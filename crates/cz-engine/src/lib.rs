//! Generation and offline rendering engine for cadenza.
//!
//! Turns a [`MusicParameters`](cz_ir::MusicParameters) set into note
//! events per layer (melody, harmony, bass), synthesizes them as
//! enveloped sine tones and mixes the layers down to a limited mono
//! buffer.

mod config;
pub mod bass;
pub mod harmony;
pub mod melody;
mod mixdown;
pub mod shaping;
pub mod tone;

pub use config::{seeded_rng, RenderConfig};
pub use mixdown::{
    bridge_events, render_layer, Arrangement, Renderer, TRANSITION_FROM_FREQUENCY, TRANSITION_STEPS,
    TRANSITION_TO_FREQUENCY,
};
pub use shaping::soft_limit;
pub use tone::{samples_for, synthesize};
