//! Multi-hit sphere sweep.

use std::sync::Arc;

use sweepcast_jobs::{JobHandle, JobScheduler};
use sweepcast_world::{CollisionWorld, SphereCommand};

use crate::error::Result;
use crate::matrix::HitMatrix;
use crate::pipeline::MultiHitSweep;
use crate::settings::SweepSettings;

/// Up to `max_hits` swept-sphere hits per query, nearest first.
///
/// Each round restarts the sphere at the previous contact point. Distances
/// are reported as the travel of the sphere center from the original origin.
/// A sphere that starts overlapping a collider never reports it.
#[derive(Debug)]
pub struct SphereSweep {
    inner: MultiHitSweep<SphereCommand>,
}

impl SphereSweep {
    /// Create a sphere sweep. Fails on zero `max_hits` or an undersized
    /// result buffer.
    pub fn new(
        queries: impl Into<Arc<[SphereCommand]>>,
        results: HitMatrix,
        max_hits: usize,
    ) -> Result<Self> {
        Self::with_settings(queries, results, max_hits, &SweepSettings::default())
    }

    /// Create a sphere sweep with explicit batch sizes.
    ///
    /// Spheres restart at their contact point, so `settings.min_step` is
    /// ignored and never rejected.
    pub fn with_settings(
        queries: impl Into<Arc<[SphereCommand]>>,
        results: HitMatrix,
        max_hits: usize,
        settings: &SweepSettings,
    ) -> Result<Self> {
        let settings = SweepSettings {
            min_step: 0.0,
            ..settings.clone()
        };
        Ok(Self {
            inner: MultiHitSweep::with_settings(queries, results, max_hits, &settings)?,
        })
    }

    /// Hit slots per query.
    pub fn max_hits(&self) -> usize {
        self.inner.max_hits()
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
