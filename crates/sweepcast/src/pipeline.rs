//! Round-based multi-hit pipeline shared by ray and sphere sweeps.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sweepcast_jobs::{JobHandle, JobScheduler};
use sweepcast_world::{CollisionWorld, RaycastHit};
use tracing::{debug, trace, warn};

use crate::command::SweepCommand;
use crate::error::{Result, SweepError};
use crate::matrix::HitMatrix;
use crate::settings::SweepSettings;
use crate::stages::{derive_commands, restore_distances, scatter_column};

/// Scratch owned by one pipeline: derived commands for rounds `1..K` and
/// nearest hits for rounds `0..K`.
struct RoundBuffers<C> {
    derived: Vec<Vec<C>>,
    hits: Vec<Vec<RaycastHit>>,
}

/// Reports up to `max_hits` hits per query, ordered by distance.
///
/// Round 0 casts the queries themselves. Every later round re-casts each
/// query from just past its previous hit, so round `r` finds the `r`-th hit.
/// A final pass re-measures distances from the original origins.
pub struct MultiHitSweep<C: SweepCommand> {
    queries: Arc<[C]>,
    results: HitMatrix,
    max_hits: usize,
    min_step: f32,
    settings: SweepSettings,
    scratch: Arc<Mutex<RoundBuffers<C>>>,
    last_run: JobHandle,
}

impl<C: SweepCommand> MultiHitSweep<C> {
    /// Create a sweep with default batch sizes.
    ///
    /// `results` must hold at least `queries.len() * max_hits` cells.
    pub fn new(
        queries: impl Into<Arc<[C]>>,
        results: HitMatrix,
        max_hits: usize,
        min_step: f32,
    ) -> Result<Self> {
        let settings = SweepSettings {
            min_step,
            ..SweepSettings::default()
        };
        Self::with_settings(queries, results, max_hits, &settings)
    }

    /// Create a sweep using `settings` for the step and batch sizes.
    pub fn with_settings(
        queries: impl Into<Arc<[C]>>,
        results: HitMatrix,
        max_hits: usize,
        settings: &SweepSettings,
    ) -> Result<Self> {
        let queries = queries.into();
        if max_hits == 0 {
            return Err(SweepError::ZeroMaxHits);
        }
        let required = queries.len().checked_mul(max_hits);
        if required.map_or(true, |required| results.len() < required) {
            return Err(SweepError::ResultBufferTooSmall {
                len: results.len(),
                queries: queries.len(),
                max_hits,
            });
        }
        if !(settings.min_step >= 0.0) {
            return Err(SweepError::NegativeMinStep(settings.min_step));
        }
        settings.validate()?;
        if max_hits == 1 {
            warn!(
                max_hits,
                "multi-hit sweep with a single slot; a nearest-hit cast does the same work"
            );
        }

        let n = queries.len();
        let scratch = RoundBuffers {
            derived: vec![vec![C::default(); n]; max_hits - 1],
            hits: vec![vec![RaycastHit::none(); n]; max_hits],
        };
        Ok(Self {
            queries,
            results,
            max_hits,
            min_step: settings.min_step,
            settings: settings.clone(),
            scratch: Arc::new(Mutex::new(scratch)),
            last_run: JobHandle::completed(),
        })
    }

    /// Hit slots per query.
    pub fn max_hits(&self) -> usize {
        self.max_hits
    }

    /// Distance a query advances past each hit before re-casting.
    pub fn min_step(&self) -> f32 {
        self.min_step
    }

    /// Number of queries.
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// The round-0 queries.
    pub fn queries(&self) -> &[C] {
        &self.queries
    }

    /// The result buffer this sweep writes.
    pub fn results(&self) -> &HitMatrix {
        &self.results
    }

    /// Schedule every round after `dependency` and return the handle of the
    /// final stage. Results are valid once that handle completes.
    ///
    /// Running the same sweep again chains after the previous run.
    pub fn run(
        &mut self,
        world: &Arc<CollisionWorld>,
        scheduler: &JobScheduler,
        dependency: JobHandle,
    ) -> JobHandle {
        debug!(
            queries = self.queries.len(),
            max_hits = self.max_hits,
            min_step = self.min_step,
            "scheduling multi-hit sweep"
        );

        let mut handle = JobHandle::combine([dependency, self.last_run.clone()]);
        for round in 0..self.max_hits {
            handle = scheduler.schedule(handle, self.cast_job(world, round));
            if round + 1 < self.max_hits {
                handle = scheduler.schedule(handle, self.derive_job(world.horizon(), round));
            }
            handle = scheduler.schedule(handle, self.scatter_job(round));
        }
        handle = scheduler.schedule(handle, self.restore_job());

        self.last_run = handle.clone();
        handle
    }

    /// Release the pipeline's scratch buffers.
    ///
    /// Stages already scheduled keep their own reference, so disposing before
    /// the run completes is safe; the buffers are freed after the last stage.
    pub fn dispose(self) {
        trace!(pending = !self.last_run.is_complete(), "disposing multi-hit sweep");
    }

    fn cast_job(&self, world: &Arc<CollisionWorld>, round: usize) -> impl FnOnce() + Send + 'static {
        let world = Arc::clone(world);
        let queries = Arc::clone(&self.queries);
        let scratch = Arc::clone(&self.scratch);
        let batch_size = self.settings.cast_batch_size;
        move || {
            trace!(round, "cast");
            let mut scratch = lock(&scratch);
            let RoundBuffers { derived, hits } = &mut *scratch;
            let commands = if round == 0 {
                &queries[..]
            } else {
                derived[round - 1].as_slice()
            };
            C::cast_batch(&world, commands, &mut hits[round], batch_size);
        }
    }

    fn derive_job(&self, horizon: f32, round: usize) -> impl FnOnce() + Send + 'static {
        let queries = Arc::clone(&self.queries);
        let scratch = Arc::clone(&self.scratch);
        let min_step = self.min_step;
        let batch_size = self.settings.derive_batch_size;
        move || {
            trace!(round, "derive");
            let mut scratch = lock(&scratch);
            let RoundBuffers { derived, hits } = &mut *scratch;
            let (earlier, later) = derived.split_at_mut(round);
            let previous = if round == 0 {
                &queries[..]
            } else {
                earlier[round - 1].as_slice()
            };
            derive_commands(previous, &hits[round], &mut later[0], min_step, horizon, batch_size);
        }
    }

    fn scatter_job(&self, round: usize) -> impl FnOnce() + Send + 'static {
        let scratch = Arc::clone(&self.scratch);
        let results = self.results.clone();
        let max_hits = self.max_hits;
        let batch_size = self.settings.scatter_batch_size;
        move || {
            trace!(round, "scatter");
            let scratch = lock(&scratch);
            scatter_column(&scratch.hits[round], &mut results.write(), max_hits, round, batch_size);
        }
    }

    fn restore_job(&self) -> impl FnOnce() + Send + 'static {
        let queries = Arc::clone(&self.queries);
        let results = self.results.clone();
        let max_hits = self.max_hits;
        let batch_size = self.settings.restore_batch_size;
        move || {
            trace!("restore distances");
            restore_distances(&queries, &mut results.write(), max_hits, batch_size);
        }
    }
}

impl<C: SweepCommand> std::fmt::Debug for MultiHitSweep<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiHitSweep")
            .field("queries", &self.queries.len())
            .field("max_hits", &self.max_hits)
            .field("min_step", &self.min_step)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use sweepcast_world::RayCommand;

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            lock(&self.0).extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logs_while_building(max_hits: usize) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let queries = vec![RayCommand::default(); 2];
        let results = HitMatrix::for_queries(queries.len(), max_hits);
        tracing::subscriber::with_default(subscriber, || {
            MultiHitSweep::<RayCommand>::new(queries, results, max_hits, 1.0e-4).unwrap();
        });

        let bytes = lock(&captured.0).clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_single_slot_warns() {
        let logs = logs_while_building(1);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("single slot"), "{logs}");
    }

    #[test]
    fn test_several_slots_do_not_warn() {
        assert!(logs_while_building(2).is_empty());
    }

    #[test]
    fn test_debug_reports_shape() {
        let sweep: MultiHitSweep<RayCommand> =
            MultiHitSweep::new(vec![RayCommand::default(); 3], HitMatrix::new(6), 2, 0.5).unwrap();
        let text = format!("{sweep:?}");
        assert!(text.contains("queries: 3"));
        assert!(text.contains("max_hits: 2"));
    }
}
