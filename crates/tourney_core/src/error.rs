//! Error taxonomy for the simulation core.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad or inconsistent configuration. Detected while loading options or
    /// constructing the engine, before any simulation runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input source could not be loaded or parsed.
    #[error("data error in {path}: {reason}")]
    Data { path: PathBuf, reason: String },

    /// The rating system could not be solved. Distinct from a valid
    /// degenerate rating so callers can retry with more smoothing or keep a
    /// previous rating.
    #[error("rating solve failed: {0}")]
    Numerical(String),

    /// Scheduling could not produce a legal round.
    #[error("scheduling failed: {0}")]
    Scheduling(String),
}

impl Error {
    pub(crate) fn data(path: impl Into<PathBuf>, reason: impl Into<String>) -> Error {
        Error::Data {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
