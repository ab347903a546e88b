//! Error types for multi-hit sweeps.

use sweepcast_jobs::JobError;
use thiserror::Error;

/// Errors that can occur while configuring or running a sweep.
#[derive(Error, Debug)]
pub enum SweepError {
    /// A sweep must report at least one hit per query.
    #[error("max_hits must be at least 1")]
    ZeroMaxHits,

    /// The result buffer cannot hold every query's hit row.
    #[error("result buffer holds {len} hits but {queries} queries need {max_hits} slots each")]
    ResultBufferTooSmall {
        /// Length of the supplied buffer.
        len: usize,
        /// Number of queries.
        queries: usize,
        /// Hit slots per query.
        max_hits: usize,
    },

    /// The ray advance past each hit must be a non-negative number.
    #[error("min_step must be non-negative, got {0}")]
    NegativeMinStep(f32),

    /// Invalid sweep settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for [`crate::SweepSettings`].
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Job infrastructure failed.
    #[error(transparent)]
    Job(#[from] JobError),
}

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, SweepError>;
