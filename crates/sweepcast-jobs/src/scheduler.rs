//! Thread pool that runs jobs once their dependencies complete.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::error::JobError;
use crate::handle::{JobHandle, Outcome};

/// Schedules jobs on a dedicated rayon pool.
///
/// Jobs never block a worker waiting on a dependency. A job is handed to the
/// pool only once its dependency has completed, and a failed dependency fails
/// every job chained after it without running them.
#[derive(Clone)]
pub struct JobScheduler {
    pool: Arc<ThreadPool>,
}

impl JobScheduler {
    /// Build a scheduler with `worker_threads` workers, or rayon's default count.
    pub fn new(worker_threads: Option<usize>) -> Result<Self, JobError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("sweepcast-worker-{index}"));
        if let Some(threads) = worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        debug!(workers = pool.current_num_threads(), "job scheduler started");
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` after `dependency` completes.
    pub fn schedule<F>(&self, dependency: JobHandle, job: F) -> JobHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let (handle, signal) = JobHandle::pending();
        let pool = Arc::clone(&self.pool);
        dependency.on_complete(move |outcome| match outcome {
            Outcome::Done => pool.spawn(move || {
                let outcome = match catch_unwind(AssertUnwindSafe(job)) {
                    Ok(()) => Outcome::Done,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(%message, "job panicked");
                        Outcome::Failed(message)
                    }
                };
                signal.finish(outcome);
            }),
            // Failures also hop through the pool, so a long chain unwinds one
            // job per task instead of nesting on a single stack.
            failed => pool.spawn(move || signal.finish(failed)),
        });
        handle
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("workers", &self.worker_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
