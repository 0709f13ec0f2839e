//! Depth-first renumbering with miss links.
//!
//! A pre-order walk assigns every node its position in the final array and
//! the node to continue with when its whole subtree is skipped:
//!
//! - the first child misses to the second child;
//! - the second child misses to wherever its parent misses;
//! - the root misses to nothing, which ends traversal.
//!
//! In the resulting order a node's first child always sits in the very next
//! slot, so a kernel only ever steps to `index + 1` or jumps to `miss`.

use super::node::{TreeNode, INVALID};

/// Annotate `nodes` in place with `depth_first_id` and `miss`.
///
/// `miss` is stored as an arena index; [`super::pack`] maps it through
/// `depth_first_id`. Returns the number of nodes visited.
pub fn flatten(nodes: &mut [TreeNode]) -> usize {
    if nodes.is_empty() {
        return 0;
    }

    let mut next_id: u32 = 0;
    // (arena index, miss link inherited from the caller)
    let mut stack: Vec<(u32, u32)> = vec![(0, INVALID)];

    while let Some((index, miss)) = stack.pop() {
        let node = &mut nodes[index as usize];
        assert_eq!(node.depth_first_id, INVALID, "node {index} visited twice");
        node.depth_first_id = next_id;
        node.miss = miss;
        next_id += 1;

        if let Some((first, second)) = node.children() {
            stack.push((second, miss));
            stack.push((first, second));
        }
    }

    assert_eq!(
        next_id as usize,
        nodes.len(),
        "depth-first walk did not reach every node"
    );
    next_id as usize
}
