//! Live engine errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveError {
    #[error("invalid parameters: {0}")]
    Parameters(#[from] cz_ir::Error),
    #[error("invalid live config: {0}")]
    InvalidConfig(&'static str),
    #[error("stream was already started")]
    AlreadyStarted,
    #[error("failed to spawn generation thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("generation thread did not stop within {0:?}")]
    StopTimeout(Duration),
}

pub type Result<T> = core::result::Result<T, LiveError>;
