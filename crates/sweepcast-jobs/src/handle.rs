//! Completion handles for scheduled jobs.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::JobError;

/// How a job finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    Failed(String),
}

type Continuation = Box<dyn FnOnce(Outcome) + Send + 'static>;

#[derive(Default)]
struct State {
    outcome: Option<Outcome>,
    continuations: Vec<Continuation>,
}

/// Completion state shared between a job and the handles that observe it.
#[derive(Default)]
pub(crate) struct Signal {
    state: Mutex<State>,
    finished: Condvar,
}

impl Signal {
    /// Record the outcome, wake waiters and run registered continuations.
    pub(crate) fn finish(&self, outcome: Outcome) {
        let continuations = {
            let mut state = lock(&self.state);
            state.outcome = Some(outcome.clone());
            std::mem::take(&mut state.continuations)
        };
        self.finished.notify_all();
        for continuation in continuations {
            continuation(outcome.clone());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Token for a scheduled job, usable as a dependency of later jobs.
///
/// The default handle is already complete.
#[derive(Clone, Default)]
pub struct JobHandle {
    signal: Option<Arc<Signal>>,
}

impl JobHandle {
    /// A handle that is already complete.
    pub fn completed() -> Self {
        Self::default()
    }

    pub(crate) fn pending() -> (Self, Arc<Signal>) {
        let signal = Arc::new(Signal::default());
        (
            Self {
                signal: Some(Arc::clone(&signal)),
            },
            signal,
        )
    }

    /// Whether the job has finished, successfully or not.
    pub fn is_complete(&self) -> bool {
        match &self.signal {
            None => true,
            Some(signal) => lock(&signal.state).outcome.is_some(),
        }
    }

    /// Block until the job has finished.
    ///
    /// Must not be called from inside a scheduled job.
    pub fn wait(&self) -> Result<(), JobError> {
        let Some(signal) = &self.signal else {
            return Ok(());
        };
        let mut state = lock(&signal.state);
        loop {
            match &state.outcome {
                Some(Outcome::Done) => return Ok(()),
                Some(Outcome::Failed(message)) => return Err(JobError::Panicked(message.clone())),
                None => {
                    state = signal
                        .finished
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Run `continuation` once this handle completes, immediately if it already has.
    pub(crate) fn on_complete(&self, continuation: impl FnOnce(Outcome) + Send + 'static) {
        let Some(signal) = &self.signal else {
            continuation(Outcome::Done);
            return;
        };
        let mut state = lock(&signal.state);
        match state.outcome.clone() {
            Some(outcome) => {
                drop(state);
                continuation(outcome);
            }
            None => state.continuations.push(Box::new(continuation)),
        }
    }

    /// A handle that completes once every handle in `handles` has.
    ///
    /// Fails with the first failure observed.
    pub fn combine(handles: impl IntoIterator<Item = JobHandle>) -> JobHandle {
        let handles: Vec<JobHandle> = handles
            .into_iter()
            .filter(|handle| handle.signal.is_some())
            .collect();
        if handles.is_empty() {
            return JobHandle::completed();
        }

        let (combined, signal) = JobHandle::pending();
        let remaining = Arc::new(Mutex::new((handles.len(), None::<String>)));
        for handle in &handles {
            let remaining = Arc::clone(&remaining);
            let signal = Arc::clone(&signal);
            handle.on_complete(move |outcome| {
                let finished = {
                    let mut remaining = lock(&remaining);
                    remaining.0 -= 1;
                    if let Outcome::Failed(message) = &outcome {
                        remaining.1.get_or_insert_with(|| message.clone());
                    }
                    (remaining.0 == 0).then(|| remaining.1.take())
                };
                if let Some(failure) = finished {
                    signal.finish(failure.map_or(Outcome::Done, Outcome::Failed));
                }
            });
        }
        combined
    }
}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("complete", &self.is_complete())
            .finish()
    }
}
