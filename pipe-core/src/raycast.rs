//! Ray queries against pipe geometry.
//!
//! The growth engine never looks at other objects directly. It asks a
//! [`CollisionQuery`] whether a ray hits anything, which keeps the scene
//! injectable and lets tests substitute fixed answers.

use glam::Vec3;

/// Hits closer than this to the ray origin are ignored, so a ray cast from
/// the centre of a face does not report that face.
pub const SELF_HIT_EPSILON: f32 = 1e-3;

const PARALLEL_EPSILON: f32 = 1e-7;

/// Result of a successful ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the (normalized) ray.
    pub distance: f32,
    /// World-space hit position.
    pub point: Vec3,
}

/// Scene-wide ray query capability.
pub trait CollisionQuery {
    /// Casts a ray from `origin` along `direction` (normalized) and returns
    /// the closest hit within `max_distance`, if any.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// An empty scene: nothing is ever hit.
impl CollisionQuery for () {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

impl<Q: CollisionQuery + ?Sized> CollisionQuery for &Q {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance)
    }
}

/// Returns whichever hit is closer.
pub fn closest(a: Option<RayHit>, b: Option<RayHit>) -> Option<RayHit> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y.distance < x.distance { y } else { x }),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Möller–Trumbore ray/triangle test.
///
/// Returns the distance `t` along `dir` at which the ray crosses the
/// triangle `v0, v1, v2`, or `None` if it misses or only touches it behind
/// the origin. Both windings are accepted.
pub fn ray_triangle(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(edge2);
    let a = edge1.dot(h);

    // Ray parallel to triangle
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > 0.0).then_some(t)
}
