//! CPU reference traversal of the packed array.
//!
//! Walks the nodes exactly as the stackless GPU kernel does: step to
//! `index + 1` to descend, jump to `miss` to skip, stop at `-1`.

use super::pack::PackedNode;
use crate::geom::{Ray, Triangle};

/// Closest intersection found by [`closest_hit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
    /// Index into the triangle array the BVH was built from.
    pub primitive: u32,
}

/// Find the nearest triangle hit with `t` in `[0, t_max]`.
pub fn closest_hit(nodes: &[PackedNode], triangles: &[Triangle], ray: &Ray, t_max: f32) -> Option<Hit> {
    let mut closest: Option<Hit> = None;
    let mut closest_t = t_max;
    let mut index = if nodes.is_empty() { None } else { Some(0) };

    while let Some(i) = index {
        let node = &nodes[i];
        if node.is_leaf() {
            let primitive = node.primitive as u32;
            if let Some((t, u, v)) = ray.intersect_triangle(&triangles[primitive as usize], 0.0, closest_t) {
                closest_t = t;
                closest = Some(Hit { t, u, v, primitive });
            }
            index = node.miss_index();
            continue;
        }

        index = match ray.intersect_aabb(&node.bounds()) {
            Some((t_enter, _)) if t_enter <= closest_t => Some(i + 1),
            _ => node.miss_index(),
        };
    }

    closest
}

/// Check whether anything is hit with `t` in `[0, t_max]`; stops at the first hit.
pub fn any_hit(nodes: &[PackedNode], triangles: &[Triangle], ray: &Ray, t_max: f32) -> bool {
    let mut index = if nodes.is_empty() { None } else { Some(0) };

    while let Some(i) = index {
        let node = &nodes[i];
        if node.is_leaf() {
            if ray
                .intersect_triangle(&triangles[node.primitive as usize], 0.0, t_max)
                .is_some()
            {
                return true;
            }
            index = node.miss_index();
        } else if ray.intersect_aabb(&node.bounds()).is_some() {
            index = Some(i + 1);
        } else {
            index = node.miss_index();
        }
    }

    false
}

/// Closest hit by testing every triangle, for cross-checking the traversal.
pub fn brute_force_closest_hit(triangles: &[Triangle], ray: &Ray, t_max: f32) -> Option<Hit> {
    let mut closest: Option<Hit> = None;
    let mut closest_t = t_max;
    for (primitive, tri) in triangles.iter().enumerate() {
        if let Some((t, u, v)) = ray.intersect_triangle(tri, 0.0, closest_t) {
            closest_t = t;
            closest = Some(Hit {
                t,
                u,
                v,
                primitive: primitive as u32,
            });
        }
    }
    closest
}
