//! Per-primitive bounds and centroids, computed once per build.

use crate::geom::Triangle;
use crate::util::{Aabb, Error, Result, Vec3};

/// Largest triangle count whose packed tree fits i32 node indices.
pub const MAX_TRIANGLES: usize = (i32::MAX as usize + 1) / 2;

/// Read-only parallel arrays indexed by primitive id.
#[derive(Debug, Clone)]
pub struct LeafTable {
    bounds: Vec<Aabb>,
    centroids: Vec<Vec3>,
}

impl LeafTable {
    /// Build the table from the caller's triangle list.
    ///
    /// Primitive id `i` refers to `triangles[i]`.
    pub fn new(triangles: &[Triangle]) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::EmptyScene);
        }
        if let Some(triangle) = triangles.iter().position(|t| !t.is_finite()) {
            return Err(Error::NonFiniteVertex { triangle });
        }
        // 2N - 1 packed nodes must be addressable by an i32 miss index.
        if triangles.len() > MAX_TRIANGLES {
            return Err(Error::TooManyTriangles(triangles.len()));
        }

        Ok(Self {
            bounds: triangles.iter().map(Triangle::bounds).collect(),
            centroids: triangles.iter().map(Triangle::centroid).collect(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Always false; an empty table cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    #[inline]
    pub fn bounds(&self, id: u32) -> &Aabb {
        &self.bounds[id as usize]
    }

    #[inline]
    pub fn centroid(&self, id: u32) -> Vec3 {
        self.centroids[id as usize]
    }

    /// Union of the bounds of every primitive.
    pub fn total_bounds(&self) -> Aabb {
        self.bounds.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b))
    }
}
