//! Cast shapes a multi-hit sweep can drive.

use nalgebra::Point3;
use sweepcast_world::{CollisionWorld, RayCommand, RaycastHit, SphereCommand};

/// A nearest-hit cast command that can be re-issued past its own hit.
///
/// `Default` must be a degenerate command that always resolves to no hit;
/// queries that stopped hitting carry it through the remaining rounds.
pub trait SweepCommand: Copy + Default + Send + Sync + 'static {
    /// Resolve `commands` into one nearest hit each.
    fn cast_batch(
        world: &CollisionWorld,
        commands: &[Self],
        hits: &mut [RaycastHit],
        batch_size: usize,
    );

    /// The command for the next round, starting at `hit`.
    ///
    /// The remaining distance shrinks by how far the origin moved.
    fn advance_past(&self, hit: &RaycastHit, min_step: f32) -> Self;

    /// This command with its distance capped at `limit`.
    fn clamped(&self, limit: f32) -> Self;

    /// Distance of `point` as measured from this command's origin.
    fn distance_from_origin(&self, point: &Point3<f32>) -> f32;
}

impl SweepCommand for RayCommand {
    fn cast_batch(
        world: &CollisionWorld,
        commands: &[Self],
        hits: &mut [RaycastHit],
        batch_size: usize,
    ) {
        world.cast_ray_batch(commands, hits, batch_size);
    }

    /// Moves `min_step` past the hit point so the same surface is not found again.
    fn advance_past(&self, hit: &RaycastHit, min_step: f32) -> Self {
        let origin = hit.point + self.direction * min_step;
        Self {
            origin,
            max_distance: self.max_distance - nalgebra::distance(&origin, &self.origin),
            ..*self
        }
    }

    fn clamped(&self, limit: f32) -> Self {
        self.with_max_distance(self.max_distance.min(limit))
    }

    fn distance_from_origin(&self, point: &Point3<f32>) -> f32 {
        nalgebra::distance(point, &self.origin)
    }
}

impl SweepCommand for SphereCommand {
    fn cast_batch(
        world: &CollisionWorld,
        commands: &[Self],
        hits: &mut [RaycastHit],
        batch_size: usize,
    ) {
        world.cast_sphere_batch(commands, hits, batch_size);
    }

    /// Restarts at the contact point. The sphere then overlaps the collider it
    /// just touched, which the cast ignores, so no step is needed.
    fn advance_past(&self, hit: &RaycastHit, _min_step: f32) -> Self {
        let origin = hit.point;
        Self {
            origin,
            max_distance: self.max_distance - nalgebra::distance(&origin, &self.origin),
            ..*self
        }
    }

    fn clamped(&self, limit: f32) -> Self {
        self.with_max_distance(self.max_distance.min(limit))
    }

    fn distance_from_origin(&self, point: &Point3<f32>) -> f32 {
        nalgebra::distance(point, &self.origin) - self.radius
    }
}
