//! Shared test scene.
//!
//! Colliders sit along the x axis, each hit by casts from `y = 4` straight down:
//!
//! | x  | collider |
//! |----|----------|
//! | 0  | solid unit box |
//! | 10 | unit box as a two-sided triangle mesh |
//! | 20 | rotated unit box as a convex hull |
//! | 30 | nothing |
//! | 40 | V-shaped groove mesh, its bottom edge on the cast line at y = 0 |
//! | 50 | two solid unit boxes stacked at y = 5 and y = 0 |

use std::sync::Arc;

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use sweepcast_jobs::JobScheduler;
use sweepcast_world::{
    Collider, ColliderKey, ColliderStrategy, CollisionWorld, RayCommand, SphereCommand, TriangleMesh,
};

pub(crate) struct Scene {
    pub world: Arc<CollisionWorld>,
    pub scheduler: JobScheduler,
    pub solid_box: ColliderKey,
    pub mesh_box: ColliderKey,
    pub convex_mesh_box: ColliderKey,
    pub groove: ColliderKey,
    pub upper_box: ColliderKey,
    pub lower_box: ColliderKey,
}

impl Scene {
    pub fn new() -> Self {
        let unit_box = TriangleMesh::cuboid(0.5, 0.5, 0.5);
        let mut world = CollisionWorld::new();

        let solid_box = world.insert(Collider::cuboid(0.5, 0.5, 0.5).with_name("box"));
        let mesh_box = world.insert(
            Collider::from_mesh(&unit_box, ColliderStrategy::TriMesh, "mesh box")
                .unwrap()
                .with_translation(10.0, 0.0, 0.0),
        );
        let tilt = UnitQuaternion::from_quaternion(Quaternion::new(
            0.4059847, 0.5954201, 0.3555247, -0.5951921,
        ));
        let convex_mesh_box = world.insert(
            Collider::from_mesh(&unit_box, ColliderStrategy::ConvexHull, "convex mesh box")
                .unwrap()
                .with_rotation(tilt)
                .with_translation(20.0, 0.0, 0.0),
        );
        let groove = world.insert(
            Collider::from_mesh(&groove_mesh(), ColliderStrategy::TriMesh, "groove")
                .unwrap()
                .with_translation(40.0, 0.0, 0.0),
        );
        let upper_box = world.insert(
            Collider::cuboid(0.5, 0.5, 0.5)
                .with_translation(50.0, 5.0, 0.0)
                .with_name("upper box"),
        );
        let lower_box = world.insert(
            Collider::cuboid(0.5, 0.5, 0.5)
                .with_translation(50.0, 0.0, 0.0)
                .with_name("lower box"),
        );

        Self {
            world: Arc::new(world),
            scheduler: JobScheduler::new(Some(4)).unwrap(),
            solid_box,
            mesh_box,
            convex_mesh_box,
            groove,
            upper_box,
            lower_box,
        }
    }
}

/// Two slopes meeting along the z axis, open at the top.
fn groove_mesh() -> TriangleMesh {
    #[rustfmt::skip]
    let vertices = vec![
        -1.0, 1.0, -1.0,
         0.0, 0.0, -1.0,
         1.0, 1.0, -1.0,
        -1.0, 1.0,  1.0,
         0.0, 0.0,  1.0,
         1.0, 1.0,  1.0,
    ];
    let indices = vec![0, 1, 4, 0, 4, 3, 1, 2, 5, 1, 5, 4];
    TriangleMesh { vertices, indices }
}

pub(crate) fn down_from(x: f32, y: f32) -> RayCommand {
    RayCommand::new(Point3::new(x, y, 0.0), -Vector3::y())
}

pub(crate) fn sphere_down_from(x: f32, y: f32, radius: f32) -> SphereCommand {
    SphereCommand::new(Point3::new(x, y, 0.0), radius, -Vector3::y())
}
