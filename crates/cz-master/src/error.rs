use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Generation(#[from] cz_ir::Error),
    #[error(transparent)]
    Live(#[from] cz_live::LiveError),
    #[error("no live stream is running")]
    NotLive,
}

pub type Result<T> = core::result::Result<T, Error>;
