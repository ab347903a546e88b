//! Per-round stages of a multi-hit sweep, each parallel over queries.

use rayon::prelude::*;
use sweepcast_world::RaycastHit;

use crate::command::SweepCommand;

/// Build next round's commands from this round's commands and hits.
///
/// Each command is capped at `horizon` before it advances, so the total
/// distance a query covers across rounds never exceeds the world's horizon.
/// A query whose hit is a miss gets `C::default()`, so it keeps missing.
pub fn derive_commands<C: SweepCommand>(
    previous: &[C],
    hits: &[RaycastHit],
    next: &mut [C],
    min_step: f32,
    horizon: f32,
    batch_size: usize,
) {
    debug_assert_eq!(previous.len(), hits.len());
    debug_assert_eq!(previous.len(), next.len());
    next.par_iter_mut()
        .zip(previous.par_iter().zip(hits.par_iter()))
        .with_min_len(batch_size.max(1))
        .for_each(|(next, (command, hit))| {
            *next = if hit.has_hit() {
                command.clamped(horizon).advance_past(hit, min_step)
            } else {
                C::default()
            };
        });
}

/// Copy one round's hits into column `round` of the result matrix.
///
/// Only the first `hits.len() * max_hits` cells are touched.
///
/// # Panics
///
/// Panics if `matrix` is shorter than `hits.len() * max_hits` or `round >= max_hits`.
pub fn scatter_column(
    hits: &[RaycastHit],
    matrix: &mut [RaycastHit],
    max_hits: usize,
    round: usize,
    batch_size: usize,
) {
    assert!(round < max_hits, "round {round} outside {max_hits} hit slots");
    matrix[..hits.len() * max_hits]
        .par_chunks_mut(max_hits)
        .zip(hits.par_iter())
        .with_min_len(batch_size.max(1))
        .for_each(|(row, hit)| row[round] = *hit);
}

/// Re-measure every hit after the first from its query's original origin.
///
/// Slot 0 is already relative to the original origin and is left alone. Each
/// row stops at its first miss.
///
/// # Panics
///
/// Panics if `max_hits` is zero or `matrix` is shorter than `queries.len() * max_hits`.
pub fn restore_distances<C: SweepCommand>(
    queries: &[C],
    matrix: &mut [RaycastHit],
    max_hits: usize,
    batch_size: usize,
) {
    matrix[..queries.len() * max_hits]
        .par_chunks_mut(max_hits)
        .zip(queries.par_iter())
        .with_min_len(batch_size.max(1))
        .for_each(|(row, query)| {
            for hit in row.iter_mut().skip(1) {
                if !hit.has_hit() {
                    break;
                }
                hit.distance = query.distance_from_origin(&hit.point);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point3, Vector3};
    use sweepcast_world::{Collider, ColliderKey, CollisionWorld, RayCommand, SphereCommand};

    fn key() -> ColliderKey {
        CollisionWorld::new().insert(Collider::ball(1.0))
    }

    fn hit(collider: ColliderKey, y: f32, distance: f32) -> RaycastHit {
        RaycastHit {
            collider: Some(collider),
            point: Point3::new(0.0, y, 0.0),
            normal: Vector3::y(),
            distance,
        }
    }

    fn down_from(y: f32) -> RayCommand {
        RayCommand::new(Point3::new(0.0, y, 0.0), -Vector3::y()).with_max_distance(100.0)
    }

    #[test]
    fn test_derive_advances_hits_and_parks_misses() {
        let k = key();
        let previous = [down_from(10.0), down_from(10.0)];
        let hits = [hit(k, 7.0, 3.0), RaycastHit::none()];
        let mut next = [RayCommand::new(Point3::origin(), Vector3::x()); 2];

        derive_commands(&previous, &hits, &mut next, 0.25, f32::INFINITY, 1);

        assert_abs_diff_eq!(next[0].origin, Point3::new(0.0, 6.75, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(next[0].max_distance, 96.75, epsilon = 1e-4);
        assert_eq!(next[1], RayCommand::default());
    }

    #[test]
    fn test_derive_caps_unbounded_queries_at_horizon() {
        let k = key();
        let previous = [RayCommand::new(Point3::new(0.0, 4.0, 0.0), -Vector3::y()), down_from(4.0)];
        let hits = [hit(k, 1.0, 3.0), hit(k, 1.0, 3.0)];
        let mut next = [RayCommand::default(); 2];

        derive_commands(&previous, &hits, &mut next, 0.25, 5.0, 1);

        assert_abs_diff_eq!(next[0].max_distance, 1.75, epsilon = 1e-5);
        assert_abs_diff_eq!(next[1].max_distance, 1.75, epsilon = 1e-5);
        assert_abs_diff_eq!(next[0].origin, Point3::new(0.0, 0.75, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scatter_fills_one_column() {
        let k = key();
        let hits = [hit(k, 1.0, 1.0), RaycastHit::none(), hit(k, 3.0, 3.0)];
        let mut matrix = vec![hit(k, 9.0, 9.0); 3 * 2 + 1];

        scatter_column(&hits, &mut matrix, 2, 1, 1);

        assert_eq!(matrix[1], hits[0]);
        assert_eq!(matrix[3], hits[1]);
        assert_eq!(matrix[5], hits[2]);
        for untouched in [0, 2, 4, 6] {
            assert_eq!(matrix[untouched].distance, 9.0);
        }
    }

    #[test]
    #[should_panic]
    fn test_scatter_rejects_out_of_range_round() {
        let mut matrix = vec![RaycastHit::none(); 2];
        scatter_column(&[RaycastHit::none()], &mut matrix, 2, 2, 1);
    }

    #[test]
    fn test_restore_rebases_ray_distances() {
        let k = key();
        let queries = [down_from(10.0)];
        let mut matrix = [hit(k, 7.0, 3.0), hit(k, 4.0, 2.9999), RaycastHit::none(), hit(k, 0.0, 1.0)];

        restore_distances(&queries, &mut matrix, 4, 1);

        assert_eq!(matrix[0].distance, 3.0);
        assert_abs_diff_eq!(matrix[1].distance, 6.0, epsilon = 1e-6);
        assert!(!matrix[2].has_hit());
        assert_eq!(matrix[3].distance, 1.0);
    }

    #[test]
    fn test_restore_subtracts_sphere_radius() {
        let k = key();
        let queries = [SphereCommand::new(Point3::new(0.0, 10.0, 0.0), 0.5, -Vector3::y())];
        let mut matrix = [hit(k, 8.0, 1.5), hit(k, 2.0, 5.5)];

        restore_distances(&queries, &mut matrix, 2, 1);

        assert_eq!(matrix[0].distance, 1.5);
        assert_abs_diff_eq!(matrix[1].distance, 7.5, epsilon = 1e-6);
    }
}
