//! Intermediate, index-based tree node produced by the builder.

use crate::util::Aabb;

/// Sentinel for "no node" / "no primitive" in intermediate indices.
pub const INVALID: u32 = u32::MAX;

/// Arena node. Children are always allocated as a pair, so only the first
/// child index is stored; the second is `first_child + 1`.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode {
    pub bounds: Aabb,
    /// Arena index of the first child, [`INVALID`] for leaves.
    pub first_child: u32,
    /// Primitive id for leaves, [`INVALID`] for internal nodes.
    pub primitive: u32,
    /// Arena index of the node to continue with when this subtree is skipped.
    /// Filled in by the flattener; [`INVALID`] means traversal ends.
    pub miss: u32,
    /// Position in depth-first order. Filled in by the flattener.
    pub depth_first_id: u32,
}

impl TreeNode {
    pub const PLACEHOLDER: Self = Self {
        bounds: Aabb::EMPTY,
        first_child: INVALID,
        primitive: INVALID,
        miss: INVALID,
        depth_first_id: INVALID,
    };

    pub fn leaf(bounds: Aabb, primitive: u32) -> Self {
        Self {
            bounds,
            primitive,
            ..Self::PLACEHOLDER
        }
    }

    pub fn internal(bounds: Aabb, first_child: u32) -> Self {
        Self {
            bounds,
            first_child,
            ..Self::PLACEHOLDER
        }
    }

    /// Leaf iff it holds a primitive iff it has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let leaf = self.primitive != INVALID;
        assert_eq!(
            leaf,
            self.first_child == INVALID,
            "node is half leaf, half internal: {self:?}"
        );
        leaf
    }

    /// Arena indices of both children, `None` for leaves.
    #[inline]
    pub fn children(&self) -> Option<(u32, u32)> {
        if self.is_leaf() {
            None
        } else {
            Some((self.first_child, self.first_child + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vec3;

    #[test]
    fn test_leaf_and_internal() {
        let b = Aabb::from_point(Vec3::ZERO, 1.0);
        let leaf = TreeNode::leaf(b, 7);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.children(), None);

        let inner = TreeNode::internal(b, 3);
        assert!(!inner.is_leaf());
        assert_eq!(inner.children(), Some((3, 4)));
    }

    #[test]
    #[should_panic(expected = "half leaf")]
    fn test_inconsistent_node_panics() {
        let mut node = TreeNode::leaf(Aabb::EMPTY, 0);
        node.first_child = 1;
        node.is_leaf();
    }
}
