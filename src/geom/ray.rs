//! Ray representation and the two intersection tests the traversal needs.

use super::Triangle;
use crate::util::{Aabb, Vec3};

/// Determinant threshold below which a ray is treated as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction, not necessarily normalized; `t` is measured in its units.
    pub direction: Vec3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    /// Evaluate the ray at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test.
    ///
    /// Returns `Some((t_enter, t_exit))` if the ray hits the box in front of
    /// its origin, with `t_enter` clamped to zero when the origin is inside.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let t0 = (aabb.min - self.origin) * self.inv_direction;
        let t1 = (aabb.max - self.origin) * self.inv_direction;

        let t_enter = t0.min(t1).max_element();
        let t_exit = t0.max(t1).min_element();

        if t_exit >= t_enter && t_exit >= 0.0 {
            Some((t_enter.max(0.0), t_exit))
        } else {
            None
        }
    }

    /// Möller–Trumbore test.
    ///
    /// Returns `(t, u, v)` with barycentrics such that the hit point is
    /// `v0 + u * (v1 - v0) + v * (v2 - v0)`, or `None` outside `[t_min, t_max]`.
    #[inline]
    pub fn intersect_triangle(&self, tri: &Triangle, t_min: f32, t_max: f32) -> Option<(f32, f32, f32)> {
        let e1 = tri.v1 - tri.v0;
        let e2 = tri.v2 - tri.v0;
        let pvec = self.direction.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = self.origin - tri.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = self.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(qvec) * inv_det;
        if t < t_min || t > t_max {
            return None;
        }
        Some((t, u, v))
    }
}
