//! Multi-hit ray sweep.

use std::sync::Arc;

use sweepcast_jobs::{JobHandle, JobScheduler};
use sweepcast_world::{CollisionWorld, RayCommand};

use crate::error::Result;
use crate::matrix::HitMatrix;
use crate::pipeline::MultiHitSweep;
use crate::settings::SweepSettings;

/// Up to `max_hits` ray hits per query, nearest first.
///
/// After each hit the ray restarts `min_step` further along, which keeps a
/// mesh edge or vertex from being reported twice. A step of zero is accepted
/// but may repeat a hit in the next slot.
#[derive(Debug)]
pub struct RaySweep {
    inner: MultiHitSweep<RayCommand>,
}

impl RaySweep {
    /// Create a ray sweep. Fails on zero `max_hits`, an undersized result
    /// buffer, or a negative `min_step`.
    pub fn new(
        queries: impl Into<Arc<[RayCommand]>>,
        results: HitMatrix,
        max_hits: usize,
        min_step: f32,
    ) -> Result<Self> {
        Ok(Self {
            inner: MultiHitSweep::new(queries, results, max_hits, min_step)?,
        })
    }

    /// Create a ray sweep with explicit settings.
    pub fn with_settings(
        queries: impl Into<Arc<[RayCommand]>>,
        results: HitMatrix,
        max_hits: usize,
        settings: &SweepSettings,
    ) -> Result<Self> {
        Ok(Self {
            inner: MultiHitSweep::with_settings(queries, results, max_hits, settings)?,
        })
    }

    /// Hit slots per query.
    pub fn max_hits(&self) -> usize {
        self.inner.max_hits()
    }

    /// Distance each ray advances past a hit.
    pub fn min_step(&self) -> f32 {
        self.inner.min_step()
    }

    /// Number of queries.
    pub fn query_count(&self) -> usize {
        self.inner.query_count()
    }

    /// The result buffer this sweep writes.
    pub fn results(&self) -> &HitMatrix {
        self.inner.results()
    }

    /// Schedule the sweep after `dependency`.
    pub fn run(
        &mut self,
        world: &Arc<CollisionWorld>,
        scheduler: &JobScheduler,
        dependency: JobHandle,
    ) -> JobHandle {
        self.inner.run(world, scheduler, dependency)
    }

    /// Release scratch buffers.
    pub fn dispose(self) {
        self.inner.dispose();
    }
}
