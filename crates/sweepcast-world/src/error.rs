//! Error types for building collision worlds.

use thiserror::Error;

/// Errors that can occur while building collision shapes.
#[derive(Error, Debug)]
pub enum WorldError {
    /// Mesh has no vertices or no triangles.
    #[error("Mesh for {0} is empty")]
    EmptyMesh(String),

    /// Failed to create collision shape.
    #[error("Failed to create collision shape for {name}: {reason}")]
    CollisionShape {
        /// Collider name.
        name: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Result type for world construction.
pub type Result<T> = std::result::Result<T, WorldError>;
