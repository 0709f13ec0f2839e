//! Input triangle type and indexed-mesh expansion.

use crate::util::{Aabb, Error, Result, Vec3};

/// A triangle given by its three vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triangle {
    #[inline]
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute AABB of this triangle.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_triangle(self.v0, self.v1, self.v2)
    }

    /// Vertex average (not the bounding box center).
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.v0.is_finite() && self.v1.is_finite() && self.v2.is_finite()
    }
}

impl From<[[f32; 3]; 3]> for Triangle {
    fn from(v: [[f32; 3]; 3]) -> Self {
        Self::new(Vec3::from(v[0]), Vec3::from(v[1]), Vec3::from(v[2]))
    }
}

/// Expand an indexed mesh into a flat triangle list.
///
/// Triangle `i` is built from `indices[3i..3i + 3]`, so primitive ids in the
/// resulting BVH are face indices of the source mesh.
pub fn triangles_from_indexed(positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<Triangle>> {
    if indices.len() % 3 != 0 {
        return Err(Error::IndexCount(indices.len()));
    }

    let fetch = |index: u32| -> Result<Vec3> {
        positions
            .get(index as usize)
            .map(|&p| Vec3::from(p))
            .ok_or(Error::VertexIndexOutOfRange {
                index,
                vertex_count: positions.len(),
            })
    };

    indices
        .chunks_exact(3)
        .map(|face| Ok(Triangle::new(fetch(face[0])?, fetch(face[1])?, fetch(face[2])?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_is_vertex_average() {
        let t = Triangle::from([[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 6.0, 0.0]]);
        assert_eq!(t.centroid(), Vec3::new(1.0, 2.0, 0.0));
        // box center differs from vertex average
        assert_eq!(t.bounds().centroid(), Vec3::new(1.5, 3.0, 0.0));
    }

    #[test]
    fn test_indexed_expansion() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let tris = triangles_from_indexed(&positions, &[0, 1, 2, 2, 1, 3]).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1].v2, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_indexed_bad_count() {
        let positions = [[0.0; 3]; 3];
        let err = triangles_from_indexed(&positions, &[0, 1]).unwrap_err();
        assert!(matches!(err, Error::IndexCount(2)));
    }

    #[test]
    fn test_indexed_out_of_range() {
        let positions = [[0.0; 3]; 3];
        let err = triangles_from_indexed(&positions, &[0, 1, 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::VertexIndexOutOfRange { index: 3, vertex_count: 3 }
        ));
    }

    #[test]
    fn test_non_finite() {
        let t = Triangle::from([[f32::NAN, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(!t.is_finite());
    }
}
