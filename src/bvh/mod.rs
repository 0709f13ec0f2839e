//! Bounding volume hierarchy over triangles, packed for stackless traversal.
//!
//! ## Pipeline
//! ```text
//! triangles → leaf table → binary tree (arena, 2N-1 nodes)
//!           → depth-first flatten (miss links) → packed 32-byte nodes
//! ```
//!
//! The packed array is built once and never mutated; a scene change means a
//! full rebuild. There is no refit or incremental update.

mod build;
mod flatten;
mod leaf;
mod node;
mod pack;
mod params;
mod stats;
mod traverse;

pub use build::Builder;
pub use flatten::flatten;
pub use leaf::{LeafTable, MAX_TRIANGLES};
pub use node::{TreeNode, INVALID};
pub use pack::{pack, PackedNode, NONE};
pub use params::*;
pub use stats::BvhStats;
pub use traverse::{brute_force_closest_hit, Hit};

use std::io::Write;

use crate::geom::{Ray, Triangle};
use crate::util::{Aabb, Result};

/// Packed BVH ready for upload.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<PackedNode>,
    primitive_count: usize,
    params: BuildParams,
}

impl Bvh {
    /// Build with default parameters.
    pub fn build(triangles: &[Triangle]) -> Result<Self> {
        Self::build_with(triangles, BuildParams::default())
    }

    /// Build from triangles. Primitive ids in the result index `triangles`.
    ///
    /// Fails on an empty or non-finite input, or invalid parameters.
    #[tracing::instrument(skip_all, fields(tri_count = triangles.len()))]
    pub fn build_with(triangles: &[Triangle], params: BuildParams) -> Result<Self> {
        params.validate()?;

        let leaves = {
            let _span = tracing::info_span!("leaf_table").entered();
            LeafTable::new(triangles)?
        };
        let mut tree = {
            let _span = tracing::info_span!("build_tree").entered();
            Builder::new(&leaves, params).build()
        };
        {
            let _span = tracing::info_span!("flatten").entered();
            flatten(&mut tree);
        }
        let nodes = {
            let _span = tracing::info_span!("pack").entered();
            pack(&tree)
        };

        let bvh = Self {
            nodes,
            primitive_count: triangles.len(),
            params,
        };
        tracing::debug!(nodes = bvh.nodes.len(), sah_cost = bvh.sah_cost(), "bvh packed");
        Ok(bvh)
    }

    /// Nodes in depth-first order; index 0 is the root.
    #[inline]
    pub fn nodes(&self) -> &[PackedNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<PackedNode> {
        self.nodes
    }

    /// Always `2 * primitive_count() - 1`.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    #[inline]
    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    pub fn root_bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, PackedNode::bounds)
    }

    /// Node array as bytes (native endianness) for GPU buffer creation.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// Write the raw node buffer.
    pub fn write_to(&self, mut writer: impl Write) -> Result<()> {
        writer.write_all(self.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn sah_cost(&self) -> f32 {
        stats::sah_cost(&self.nodes, self.params.traversal_cost)
    }

    pub fn stats(&self) -> BvhStats {
        stats::stats(&self.nodes, self.params.traversal_cost)
    }

    /// Check the structural invariants of the packed array.
    pub fn validate(&self) -> Result<()> {
        stats::validate(&self.nodes, self.primitive_count)
    }

    /// Nearest hit along `ray` within `[0, t_max]`.
    ///
    /// `triangles` must be the slice the BVH was built from.
    pub fn closest_hit(&self, triangles: &[Triangle], ray: &Ray, t_max: f32) -> Option<Hit> {
        debug_assert_eq!(triangles.len(), self.primitive_count);
        traverse::closest_hit(&self.nodes, triangles, ray, t_max)
    }

    /// Whether anything is hit along `ray` within `[0, t_max]`.
    pub fn any_hit(&self, triangles: &[Triangle], ray: &Ray, t_max: f32) -> bool {
        debug_assert_eq!(triangles.len(), self.primitive_count);
        traverse::any_hit(&self.nodes, triangles, ray, t_max)
    }
}
