#![warn(missing_docs)]

//! Dependency-chained jobs on a rayon thread pool.
//!
//! A [`JobScheduler`] accepts a job plus the [`JobHandle`] it depends on and
//! returns a new handle. Callers chain stages by passing each returned handle
//! into the next schedule call, then [`JobHandle::wait`] on the last one.
//!
//! # Example
//!
//! ```ignore
//! use sweepcast_jobs::{JobHandle, JobScheduler};
//!
//! let scheduler = JobScheduler::new(None)?;
//! let first = scheduler.schedule(JobHandle::completed(), || println!("one"));
//! let second = scheduler.schedule(first, || println!("two"));
//! second.wait()?;
//! ```

mod error;
mod handle;
mod scheduler;

pub use error::JobError;
pub use handle::JobHandle;
pub use scheduler::JobScheduler;
