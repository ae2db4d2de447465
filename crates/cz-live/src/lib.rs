//! Live streaming engine for cadenza.
//!
//! A background thread synthesizes a single melodic voice into a bounded
//! sample ring while the consumer pulls fixed-size blocks. Parameters can
//! be replaced mid-stream; tempo and volume glide to the new values over
//! the requested transition time.

mod config;
mod error;
mod stream;
mod transition;
mod voice;

pub use config::LiveConfig;
pub use error::{LiveError, Result};
pub use stream::LiveStream;
pub use transition::Transition;
pub use voice::LiveVoice;
