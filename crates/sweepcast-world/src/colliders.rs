//! Colliders and collision shape generation from triangle meshes.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use parry3d::shape::{ConvexPolyhedron, SharedShape, TriMesh};
use serde::{Deserialize, Serialize};

use crate::command::LayerMask;
use crate::error::{Result, WorldError};

/// Indexed triangle mesh with flat vertex and index buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions, three floats per vertex.
    pub vertices: Vec<f32>,
    /// Triangle indices, three per triangle, counter-clockwise seen from outside.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Closed box mesh centered at the origin, two triangles per face.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            -hx, -hy, -hz,
             hx, -hy, -hz,
             hx,  hy, -hz,
            -hx,  hy, -hz,
            -hx, -hy,  hz,
             hx, -hy,  hz,
             hx,  hy,  hz,
            -hx,  hy,  hz,
        ];
        #[rustfmt::skip]
        let indices = vec![
            // -Z
            0, 3, 2, 0, 2, 1,
            // +Z
            4, 5, 6, 4, 6, 7,
            // -Y
            0, 1, 5, 0, 5, 4,
            // +Y
            3, 7, 6, 3, 6, 2,
            // -X
            0, 4, 7, 0, 7, 3,
            // +X
            1, 2, 6, 1, 6, 5,
        ];
        Self { vertices, indices }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn points(&self) -> Vec<Point3<f32>> {
        self.vertices
            .chunks_exact(3)
            .map(|v| Point3::new(v[0], v[1], v[2]))
            .collect()
    }
}

/// Strategy for generating collision shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderStrategy {
    /// Convex hull of the mesh vertices (solid).
    #[default]
    ConvexHull,
    /// Triangle mesh (two-sided surface, may be non-convex).
    TriMesh,
}

/// Generate a collision shape from a triangle mesh.
///
/// # Arguments
///
/// * `mesh` - The triangle mesh to convert
/// * `strategy` - The collision shape strategy to use
/// * `name` - Name for error messages
pub fn mesh_to_shape(
    mesh: &TriangleMesh,
    strategy: ColliderStrategy,
    name: &str,
) -> Result<SharedShape> {
    if mesh.vertices.len() < 3 || mesh.indices.len() < 3 {
        return Err(WorldError::EmptyMesh(name.to_string()));
    }

    match strategy {
        ColliderStrategy::ConvexHull => create_convex_hull(mesh, name),
        ColliderStrategy::TriMesh => create_trimesh(mesh, name),
    }
}

fn create_convex_hull(mesh: &TriangleMesh, name: &str) -> Result<SharedShape> {
    let points = mesh.points();

    if points.len() < 4 {
        return Err(WorldError::CollisionShape {
            name: name.to_string(),
            reason: "Need at least 4 points for convex hull".to_string(),
        });
    }

    ConvexPolyhedron::from_convex_hull(&points)
        .map(SharedShape::new)
        .ok_or_else(|| WorldError::CollisionShape {
            name: name.to_string(),
            reason: "Degenerate convex hull".to_string(),
        })
}

fn create_trimesh(mesh: &TriangleMesh, name: &str) -> Result<SharedShape> {
    let vertex_count = mesh.vertices.len() / 3;
    let indices: Vec<[u32; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|i| [i[0], i[1], i[2]])
        .collect();

    if let Some(bad) = indices.iter().flatten().find(|&&i| i as usize >= vertex_count) {
        return Err(WorldError::CollisionShape {
            name: name.to_string(),
            reason: format!("Index {bad} out of range for {vertex_count} vertices"),
        });
    }

    match TriMesh::new(mesh.points(), indices) {
        Ok(trimesh) => Ok(SharedShape::new(trimesh)),
        Err(e) => Err(WorldError::CollisionShape {
            name: name.to_string(),
            reason: format!("Failed to create trimesh: {:?}", e),
        }),
    }
}

/// A shape placed in the world.
#[derive(Clone)]
pub struct Collider {
    /// Collision geometry in local space.
    pub shape: SharedShape,
    /// Local-to-world transform.
    pub position: Isometry3<f32>,
    /// Layers this collider belongs to.
    pub layers: LayerMask,
    /// Optional name, used in diagnostics.
    pub name: Option<String>,
}

impl Collider {
    /// Create a collider at the origin on every layer.
    pub fn new(shape: SharedShape) -> Self {
        Self {
            shape,
            position: Isometry3::identity(),
            layers: LayerMask::ALL,
            name: None,
        }
    }

    /// Axis-aligned box with the given half extents.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::new(SharedShape::cuboid(hx, hy, hz))
    }

    /// Sphere with the given radius.
    pub fn ball(radius: f32) -> Self {
        Self::new(SharedShape::ball(radius))
    }

    /// Collider built from a mesh with [`mesh_to_shape`].
    pub fn from_mesh(mesh: &TriangleMesh, strategy: ColliderStrategy, name: &str) -> Result<Self> {
        Ok(Self::new(mesh_to_shape(mesh, strategy, name)?).with_name(name))
    }

    /// Set the translation, keeping the rotation.
    pub fn with_translation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position.translation = Translation3::new(x, y, z);
        self
    }

    /// Set the rotation, keeping the translation.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.position.rotation = rotation;
        self
    }

    /// Set the layer membership.
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Set the diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether ray casts treat this collider as a two-sided triangle surface.
    pub fn is_surface(&self) -> bool {
        self.shape.as_trimesh().is_some()
    }
}

impl std::fmt::Debug for Collider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("shape", &self.shape.shape_type())
            .field("position", &self.position)
            .field("layers", &self.layers)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_mesh_layout() {
        let mesh = TriangleMesh::cuboid(0.5, 0.5, 0.5);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_cuboid_mesh_winding_is_outward() {
        let mesh = TriangleMesh::cuboid(0.5, 1.0, 2.0);
        let points = mesh.points();
        for tri in mesh.indices.chunks_exact(3) {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            let normal = (b - a).cross(&(c - a));
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_convex_hull() {
        let mesh = TriangleMesh::cuboid(0.5, 0.5, 0.5);
        let shape = mesh_to_shape(&mesh, ColliderStrategy::ConvexHull, "test").unwrap();
        assert!(shape.as_convex_polyhedron().is_some());
    }

    #[test]
    fn test_trimesh() {
        let mesh = TriangleMesh::cuboid(0.5, 0.5, 0.5);
        let shape = mesh_to_shape(&mesh, ColliderStrategy::TriMesh, "test").unwrap();
        assert!(shape.as_trimesh().is_some());
    }

    #[test]
    fn test_empty_mesh() {
        let result = mesh_to_shape(&TriangleMesh::default(), ColliderStrategy::TriMesh, "empty");
        assert!(matches!(result, Err(WorldError::EmptyMesh(name)) if name == "empty"));
    }

    #[test]
    fn test_out_of_range_index() {
        let mesh = TriangleMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 7],
        };
        let result = mesh_to_shape(&mesh, ColliderStrategy::TriMesh, "bad");
        assert!(matches!(result, Err(WorldError::CollisionShape { .. })));
    }

    #[test]
    fn test_hull_needs_four_points() {
        let mesh = TriangleMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
        };
        let result = mesh_to_shape(&mesh, ColliderStrategy::ConvexHull, "tri");
        assert!(matches!(result, Err(WorldError::CollisionShape { .. })));
    }

    #[test]
    fn test_collider_builder() {
        let collider = Collider::cuboid(1.0, 1.0, 1.0)
            .with_translation(1.0, 2.0, 3.0)
            .with_layers(LayerMask(0b10))
            .with_name("crate");
        assert_eq!(collider.position.translation.vector.z, 3.0);
        assert_eq!(collider.layers, LayerMask(0b10));
        assert_eq!(collider.name.as_deref(), Some("crate"));
        assert!(!collider.is_surface());
    }
}
