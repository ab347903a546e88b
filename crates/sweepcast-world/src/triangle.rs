//! Two-sided ray-triangle intersection.

use nalgebra::{Point3, Vector3};
use parry3d::shape::Triangle;

/// Tolerance on barycentric coordinates so shared edges are hit by both triangles.
const BARYCENTRIC_EPS: f32 = 1e-6;

/// Determinants below this are treated as rays parallel to the triangle.
const PARALLEL_EPS: f32 = 1e-9;

/// Intersection of a ray with a single triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TriangleHit {
    /// Parameter along the ray.
    pub t: f32,
    /// Unit face normal, oriented against the ray.
    pub normal: Vector3<f32>,
}

/// Möller-Trumbore intersection, ignoring winding.
///
/// Accepts `0 <= t <= max_t`: a ray starting exactly on the triangle reports a
/// hit at `t = 0`.
pub(crate) fn intersect_triangle(
    triangle: &Triangle,
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
    max_t: f32,
) -> Option<TriangleHit> {
    let edge1 = triangle.b - triangle.a;
    let edge2 = triangle.c - triangle.a;

    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < PARALLEL_EPS {
        return None;
    }

    let s = *origin - triangle.a;
    let u = s.dot(&h) / det;
    if !(-BARYCENTRIC_EPS..=1.0 + BARYCENTRIC_EPS).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = direction.dot(&q) / det;
    if v < -BARYCENTRIC_EPS || u + v > 1.0 + BARYCENTRIC_EPS {
        return None;
    }

    let t = edge2.dot(&q) / det;
    if !(0.0..=max_t).contains(&t) {
        return None;
    }

    let face = edge1.cross(&edge2);
    let normal = if face.dot(direction) > 0.0 { -face } else { face };
    Some(TriangleHit {
        t,
        normal: normal.try_normalize(f32::EPSILON)?,
    })
}
