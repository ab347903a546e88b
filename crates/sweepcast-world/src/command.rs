//! Cast commands and hit records.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::ColliderKey;

/// Bit set of collision layers.
///
/// Colliders carry the layers they belong to; commands carry the layers they
/// can hit. A pair interacts when the two masks share a bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// No layer.
    pub const NONE: Self = Self(0);

    /// Mask with a single layer set. Indices past 31 name no layer.
    pub const fn layer(index: u32) -> Self {
        match 1u32.checked_shl(index) {
            Some(bits) => Self(bits),
            None => Self::NONE,
        }
    }

    /// Whether the two masks share a layer.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no layer is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A ray cast request resolving to at most one nearest hit.
///
/// The default command is degenerate and never hits anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCommand {
    /// Start of the ray.
    pub origin: Point3<f32>,
    /// Unit direction. Not normalized by the world.
    pub direction: Vector3<f32>,
    /// Maximum travel distance.
    pub max_distance: f32,
    /// Layers the ray can hit.
    pub layer_mask: LayerMask,
}

impl RayCommand {
    /// Unbounded ray hitting every layer.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction,
            max_distance: f32::INFINITY,
            layer_mask: LayerMask::ALL,
        }
    }

    /// Limit the travel distance.
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Restrict the layers the ray can hit.
    pub fn with_layer_mask(mut self, layer_mask: LayerMask) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        !(self.max_distance > 0.0) || self.layer_mask.is_empty() || self.direction == Vector3::zeros()
    }
}

impl Default for RayCommand {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            direction: Vector3::zeros(),
            max_distance: 0.0,
            layer_mask: LayerMask::NONE,
        }
    }
}

/// A swept sphere request resolving to at most one nearest hit.
///
/// The default command is degenerate and never hits anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCommand {
    /// Start position of the sphere center.
    pub origin: Point3<f32>,
    /// Sphere radius.
    pub radius: f32,
    /// Unit sweep direction.
    pub direction: Vector3<f32>,
    /// Maximum travel distance of the center.
    pub max_distance: f32,
    /// Layers the sphere can hit.
    pub layer_mask: LayerMask,
}

impl SphereCommand {
    /// Unbounded sweep hitting every layer.
    pub fn new(origin: Point3<f32>, radius: f32, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            radius,
            direction,
            max_distance: f32::INFINITY,
            layer_mask: LayerMask::ALL,
        }
    }

    /// Limit the travel distance.
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Restrict the layers the sphere can hit.
    pub fn with_layer_mask(mut self, layer_mask: LayerMask) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        !(self.max_distance > 0.0)
            || !(self.radius > 0.0)
            || self.layer_mask.is_empty()
            || self.direction == Vector3::zeros()
    }
}

impl Default for SphereCommand {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            radius: 0.0,
            direction: Vector3::zeros(),
            max_distance: 0.0,
            layer_mask: LayerMask::NONE,
        }
    }
}

/// Result of a cast: either a hit on a collider or the no-hit sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Collider that was hit, `None` for no hit.
    pub collider: Option<ColliderKey>,
    /// World-space contact point.
    pub point: Point3<f32>,
    /// World-space surface normal at the contact.
    pub normal: Vector3<f32>,
    /// Distance travelled along the cast direction.
    pub distance: f32,
}

impl RaycastHit {
    /// The no-hit sentinel.
    pub fn none() -> Self {
        Self {
            collider: None,
            point: Point3::origin(),
            normal: Vector3::zeros(),
            distance: 0.0,
        }
    }

    /// Whether this record is a hit.
    #[inline]
    pub fn has_hit(&self) -> bool {
        self.collider.is_some()
    }
}

impl Default for RaycastHit {
    fn default() -> Self {
        Self::none()
    }
}
