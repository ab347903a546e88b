//! Collision world and its nearest-hit cast primitive.

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::query::{self, Ray, ShapeCastOptions};
use parry3d::shape::{Ball, TriMesh};
use rayon::prelude::*;
use slotmap::SlotMap;

use crate::colliders::Collider;
use crate::command::{LayerMask, RayCommand, RaycastHit, SphereCommand};
use crate::triangle::{intersect_triangle, TriangleHit};

slotmap::new_key_type! {
    /// Stable identity of a collider inside a [`CollisionWorld`].
    pub struct ColliderKey;
}

/// Default upper bound on any cast distance.
pub const DEFAULT_HORIZON: f32 = 1.0e4;

/// Crossings of one mesh closer than this are reported once by the all-hits queries.
const COINCIDENT_EPS: f32 = 1e-5;

/// A set of static colliders answering ray and sphere casts.
///
/// Casts scan every collider; there is no broad phase.
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    colliders: SlotMap<ColliderKey, Collider>,
    horizon: f32,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    /// Create an empty world with the default horizon.
    pub fn new() -> Self {
        Self::with_horizon(DEFAULT_HORIZON)
    }

    /// Create an empty world whose casts never travel further than `horizon`.
    pub fn with_horizon(horizon: f32) -> Self {
        Self {
            colliders: SlotMap::with_key(),
            horizon,
        }
    }

    /// Maximum distance any cast travels.
    pub fn horizon(&self) -> f32 {
        self.horizon
    }

    /// Change the maximum cast distance.
    pub fn set_horizon(&mut self, horizon: f32) {
        self.horizon = horizon;
    }

    /// Add a collider.
    pub fn insert(&mut self, collider: Collider) -> ColliderKey {
        self.colliders.insert(collider)
    }

    /// Remove a collider.
    pub fn remove(&mut self, key: ColliderKey) -> Option<Collider> {
        self.colliders.remove(key)
    }

    /// Look up a collider.
    pub fn get(&self, key: ColliderKey) -> Option<&Collider> {
        self.colliders.get(key)
    }

    /// Number of colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the world has no colliders.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Iterate over all colliders.
    pub fn iter(&self) -> impl Iterator<Item = (ColliderKey, &Collider)> {
        self.colliders.iter()
    }

    fn on_layers(&self, mask: LayerMask) -> impl Iterator<Item = (ColliderKey, &Collider)> {
        self.colliders
            .iter()
            .filter(move |(_, collider)| collider.layers.intersects(mask))
    }

    /// Nearest hit of a ray, or the no-hit sentinel.
    ///
    /// Solid shapes containing the origin are ignored. Triangle meshes are
    /// two-sided and report crossings starting at distance zero.
    pub fn cast_ray(&self, command: &RayCommand) -> RaycastHit {
        if command.is_degenerate() {
            return RaycastHit::none();
        }
        let max = command.max_distance.min(self.horizon);

        let mut nearest = RaycastHit::none();
        let mut nearest_t = f32::INFINITY;
        for (key, collider) in self.on_layers(command.layer_mask) {
            let candidate = match collider.shape.as_trimesh() {
                Some(trimesh) => surface_crossings(trimesh, &collider.position, command, max)
                    .min_by(|a, b| a.t.total_cmp(&b.t))
                    .map(|hit| (hit.t, collider.position.rotation * hit.normal)),
                None => solid_entry(collider, command, max),
            };
            if let Some((t, normal)) = candidate {
                if t < nearest_t {
                    nearest_t = t;
                    nearest = RaycastHit {
                        collider: Some(key),
                        point: command.at(t),
                        normal,
                        distance: t,
                    };
                }
            }
        }
        nearest
    }

    /// Every hit of a ray from its origin, unsorted.
    ///
    /// Solid shapes contribute their entry point, meshes every distinct crossing.
    pub fn cast_ray_all(&self, command: &RayCommand) -> Vec<RaycastHit> {
        let mut hits = Vec::new();
        if command.is_degenerate() {
            return hits;
        }
        let max = command.max_distance.min(self.horizon);

        for (key, collider) in self.on_layers(command.layer_mask) {
            let to_hit = |t: f32, normal: Vector3<f32>| RaycastHit {
                collider: Some(key),
                point: command.at(t),
                normal,
                distance: t,
            };
            match collider.shape.as_trimesh() {
                Some(trimesh) => {
                    let mut crossings: Vec<TriangleHit> =
                        surface_crossings(trimesh, &collider.position, command, max).collect();
                    crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
                    crossings.dedup_by(|later, earlier| later.t - earlier.t <= COINCIDENT_EPS);
                    hits.extend(
                        crossings
                            .into_iter()
                            .map(|hit| to_hit(hit.t, collider.position.rotation * hit.normal)),
                    );
                }
                None => {
                    if let Some((t, normal)) = solid_entry(collider, command, max) {
                        hits.push(to_hit(t, normal));
                    }
                }
            }
        }
        hits
    }

    /// Nearest hit of a swept sphere, or the no-hit sentinel.
    ///
    /// Colliders overlapping the sphere at its start are ignored. The hit point
    /// lies on the collider surface; the distance is the center's travel.
    pub fn cast_sphere(&self, command: &SphereCommand) -> RaycastHit {
        if command.is_degenerate() {
            return RaycastHit::none();
        }
        let max = command.max_distance.min(self.horizon);

        self.on_layers(command.layer_mask)
            .filter_map(|(key, collider)| sphere_contact(key, collider, command, max))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap_or_default()
    }

    /// First contact with every collider the sphere reaches, unsorted.
    pub fn cast_sphere_all(&self, command: &SphereCommand) -> Vec<RaycastHit> {
        if command.is_degenerate() {
            return Vec::new();
        }
        let max = command.max_distance.min(self.horizon);

        self.on_layers(command.layer_mask)
            .filter_map(|(key, collider)| sphere_contact(key, collider, command, max))
            .collect()
    }

    /// Resolve a batch of rays into `hits`, one nearest hit per command.
    ///
    /// `batch_size` is the minimum number of commands handed to one worker.
    pub fn cast_ray_batch(&self, commands: &[RayCommand], hits: &mut [RaycastHit], batch_size: usize) {
        debug_assert_eq!(commands.len(), hits.len());
        hits.par_iter_mut()
            .zip(commands.par_iter())
            .with_min_len(batch_size.max(1))
            .for_each(|(hit, command)| *hit = self.cast_ray(command));
    }

    /// Resolve a batch of sphere sweeps into `hits`, one nearest hit per command.
    pub fn cast_sphere_batch(
        &self,
        commands: &[SphereCommand],
        hits: &mut [RaycastHit],
        batch_size: usize,
    ) {
        debug_assert_eq!(commands.len(), hits.len());
        hits.par_iter_mut()
            .zip(commands.par_iter())
            .with_min_len(batch_size.max(1))
            .for_each(|(hit, command)| *hit = self.cast_sphere(command));
    }
}

/// Entry point of a ray into a solid shape. `None` when the origin is inside.
fn solid_entry(collider: &Collider, command: &RayCommand, max: f32) -> Option<(f32, Vector3<f32>)> {
    if collider.shape.contains_point(&collider.position, &command.origin) {
        return None;
    }
    let ray = Ray::new(command.origin, command.direction);
    let hit = collider
        .shape
        .cast_ray_and_get_normal(&collider.position, &ray, max, true)?;
    (hit.time_of_impact > 0.0).then_some((hit.time_of_impact, hit.normal))
}

/// All triangle crossings of a ray, in mesh-local space.
fn surface_crossings<'a>(
    trimesh: &'a TriMesh,
    position: &Isometry3<f32>,
    command: &RayCommand,
    max: f32,
) -> impl Iterator<Item = TriangleHit> + 'a {
    let origin: Point3<f32> = position.inverse_transform_point(&command.origin);
    let direction = position.inverse_transform_vector(&command.direction);
    trimesh
        .triangles()
        .filter_map(move |triangle| intersect_triangle(&triangle, &origin, &direction, max))
}

fn sphere_contact(
    key: ColliderKey,
    collider: &Collider,
    command: &SphereCommand,
    max: f32,
) -> Option<RaycastHit> {
    let ball = Ball::new(command.radius);
    let start = Isometry3::translation(command.origin.x, command.origin.y, command.origin.z);
    let shape = &*collider.shape;

    match query::intersection_test(&start, &ball, &collider.position, shape) {
        Ok(false) => {}
        Ok(true) => return None,
        Err(_) => {
            tracing::warn!(collider = ?collider.name, "shape unsupported by sphere overlap test");
            return None;
        }
    }

    let options = ShapeCastOptions::with_max_time_of_impact(max);
    let hit = match query::cast_shapes(
        &start,
        &command.direction,
        &ball,
        &collider.position,
        &Vector3::zeros(),
        shape,
        options,
    ) {
        Ok(hit) => hit?,
        Err(_) => {
            tracing::warn!(collider = ?collider.name, "shape unsupported by sphere cast");
            return None;
        }
    };

    // The cast's witness points are approximate; the contact is the point of
    // the collider nearest the sphere center at impact.
    let center = command.origin + command.direction * hit.time_of_impact;
    let contact = shape.project_point(&collider.position, &center, false).point;
    let normal = (center - contact)
        .try_normalize(1.0e-6)
        .unwrap_or_else(|| collider.position.rotation * hit.normal2.into_inner());

    Some(RaycastHit {
        collider: Some(key),
        point: contact,
        normal,
        distance: hit.time_of_impact,
    })
}
