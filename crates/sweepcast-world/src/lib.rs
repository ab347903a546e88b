#![warn(missing_docs)]

//! Collision world with a batched nearest-hit cast primitive.
//!
//! This crate answers "what is the nearest thing this ray (or swept sphere)
//! hits?" for batches of commands, using parry3d shapes for the geometry.
//!
//! # Features
//!
//! - Cuboid, ball, convex hull and triangle mesh colliders
//! - Layer masks on colliders and commands
//! - Nearest-hit casts, single or batched in parallel with rayon
//! - All-hits reference casts for checking multi-hit queries
//!
//! # Cast conventions
//!
//! - Solid shapes that contain a ray origin, or overlap a sphere at its start,
//!   are ignored by that cast.
//! - Triangle meshes are two-sided surfaces. A ray starting exactly on a
//!   triangle reports it again at distance zero.
//! - A missed cast returns [`RaycastHit::none`]; the sentinel is the absent
//!   collider, never the hit point.
//!
//! # Example
//!
//! ```ignore
//! use nalgebra::{Point3, Vector3};
//! use sweepcast_world::{Collider, CollisionWorld, RayCommand};
//!
//! let mut world = CollisionWorld::new();
//! let floor = world.insert(Collider::cuboid(10.0, 0.5, 10.0));
//!
//! let hit = world.cast_ray(&RayCommand::new(Point3::new(0.0, 5.0, 0.0), -Vector3::y()));
//! assert_eq!(hit.collider, Some(floor));
//! ```

mod colliders;
mod command;
mod error;
mod triangle;
mod world;

pub use colliders::{mesh_to_shape, Collider, ColliderStrategy, TriangleMesh};
pub use command::{LayerMask, RayCommand, RaycastHit, SphereCommand};
pub use error::{Result, WorldError};
pub use world::{ColliderKey, CollisionWorld, DEFAULT_HORIZON};
