#![warn(missing_docs)]

//! First-K-hits ray and sphere sweeps.
//!
//! A collision world usually answers "what is the nearest hit?" for a batch
//! of casts. This crate turns that primitive into "what are the first K hits,
//! nearest first?" by re-casting each query from just past its previous hit,
//! one round per hit slot, and re-measuring distances from the original
//! origin at the end.
//!
//! # Features
//!
//! - [`RaySweep`] and [`SphereSweep`] over a [`sweepcast_world::CollisionWorld`]
//! - Rounds run as chained jobs on a [`sweepcast_jobs::JobScheduler`]
//! - Results in a shared row-major [`HitMatrix`], one row of K slots per query
//! - [`SweepSettings`] from code or TOML
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nalgebra::{Point3, Vector3};
//! use sweepcast::{HitMatrix, RaySweep, SweepSettings};
//! use sweepcast_jobs::JobHandle;
//! use sweepcast_world::{Collider, RayCommand};
//!
//! let settings = SweepSettings::default();
//! let mut world = settings.build_world();
//! world.insert(Collider::cuboid(1.0, 1.0, 1.0));
//! let world = Arc::new(world);
//! let scheduler = settings.build_scheduler()?;
//!
//! let queries = vec![RayCommand::new(Point3::new(0.0, 5.0, 0.0), -Vector3::y())];
//! let results = HitMatrix::for_queries(queries.len(), 4);
//! let mut sweep = RaySweep::with_settings(queries, results.clone(), 4, &settings)?;
//! sweep.run(&world, &scheduler, JobHandle::completed()).wait()?;
//! sweep.dispose();
//!
//! for hit in results.row(0, 4).iter().take_while(|hit| hit.has_hit()) {
//!     println!("{:?} at {}", hit.collider, hit.distance);
//! }
//! ```

mod command;
mod error;
mod matrix;
mod pipeline;
mod ray;
#[cfg(test)]
mod scene;
mod settings;
mod sphere;
mod stages;

pub use command::SweepCommand;
pub use error::{Result, SweepError};
pub use matrix::HitMatrix;
pub use pipeline::MultiHitSweep;
pub use ray::RaySweep;
pub use settings::{SweepSettings, DEFAULT_MIN_STEP};
pub use sphere::SphereSweep;
pub use stages::{derive_commands, restore_distances, scatter_column};
