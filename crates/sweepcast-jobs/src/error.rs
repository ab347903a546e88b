//! Error types for job scheduling.

use thiserror::Error;

/// Errors reported when waiting on or building job infrastructure.
#[derive(Error, Debug)]
pub enum JobError {
    /// A job in the chain panicked.
    #[error("job panicked: {0}")]
    Panicked(String),

    /// The thread pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
