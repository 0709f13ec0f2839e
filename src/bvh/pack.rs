//! GPU storage layout for the flattened tree.

use bytemuck::{Pod, Zeroable};

use super::node::{TreeNode, INVALID};
use crate::util::Aabb;

/// Index value meaning "no node" (end of traversal) or "no primitive".
pub const NONE: i32 = -1;

/// GPU-friendly BVH node (32 bytes, matches the traversal kernel's struct).
///
/// Internal node: `primitive = -1`, first child at `index + 1`.
/// Leaf node: `primitive` = index into the caller's triangle array.
/// Both: `miss` = index to continue at when the subtree is skipped, `-1` to stop.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PackedNode {
    pub aabb_min: [f32; 3],
    pub miss: i32,
    pub aabb_max: [f32; 3],
    pub primitive: i32,
}

const _: () = assert!(std::mem::size_of::<PackedNode>() == 32);

impl PackedNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.primitive != NONE
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.aabb_min.into(), self.aabb_max.into())
    }

    /// Miss link as an array index, `None` at the end of traversal.
    #[inline]
    pub fn miss_index(&self) -> Option<usize> {
        usize::try_from(self.miss).ok()
    }
}

#[inline]
fn to_i32(value: u32) -> i32 {
    if value == INVALID {
        NONE
    } else {
        i32::try_from(value).expect("node index exceeds i32 range")
    }
}

/// Copy flattened nodes into depth-first array order.
///
/// `packed[node.depth_first_id]` receives each node; its arena-index miss link
/// is rewritten to the target's depth-first id.
pub fn pack(nodes: &[TreeNode]) -> Vec<PackedNode> {
    let mut packed = vec![PackedNode::zeroed(); nodes.len()];

    for node in nodes {
        assert_ne!(node.depth_first_id, INVALID, "packing an unflattened tree");
        let miss = if node.miss == INVALID {
            INVALID
        } else {
            nodes[node.miss as usize].depth_first_id
        };
        let primitive = if node.is_leaf() { node.primitive } else { INVALID };

        packed[node.depth_first_id as usize] = PackedNode {
            aabb_min: node.bounds.min.to_array(),
            miss: to_i32(miss),
            aabb_max: node.bounds.max.to_array(),
            primitive: to_i32(primitive),
        };
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::flatten::flatten;
    use crate::util::Vec3;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<PackedNode>(), 32);
        assert_eq!(std::mem::offset_of!(PackedNode, miss), 12);
        assert_eq!(std::mem::offset_of!(PackedNode, aabb_max), 16);
        assert_eq!(std::mem::offset_of!(PackedNode, primitive), 28);
    }

    #[test]
    fn test_bytes_field_order() {
        let node = PackedNode {
            aabb_min: [1.0, 2.0, 3.0],
            miss: NONE,
            aabb_max: [4.0, 5.0, 6.0],
            primitive: 9,
        };
        let bytes: &[u8] = bytemuck::bytes_of(&node);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &(-1i32).to_ne_bytes());
        assert_eq!(&bytes[28..32], &9i32.to_ne_bytes());
    }

    #[test]
    fn test_miss_translated_through_depth_first_ids() {
        //        0
        //      /   \
        //     3     4
        //          / \
        //         1   2
        let b = |x: f32| Aabb::from_point(Vec3::splat(x), 0.5);
        let mut nodes = vec![
            TreeNode::internal(b(0.0), 3),
            TreeNode::leaf(b(1.0), 1),
            TreeNode::leaf(b(2.0), 2),
            TreeNode::leaf(b(3.0), 0),
            TreeNode::internal(b(4.0), 1),
        ];
        flatten(&mut nodes);
        let packed = pack(&nodes);

        let prims: Vec<i32> = packed.iter().map(|n| n.primitive).collect();
        assert_eq!(prims, vec![NONE, 0, NONE, 1, 2]);
        let misses: Vec<i32> = packed.iter().map(|n| n.miss).collect();
        assert_eq!(misses, vec![NONE, 2, NONE, 4, NONE]);

        // arena node 4 lands at slot 2 with its own box
        assert_eq!(packed[2].bounds(), b(4.0));
        assert_eq!(packed[1].miss_index(), Some(2));
        assert_eq!(packed[0].miss_index(), None);
    }
}
