//! Cost, shape and structural checks over a packed node array.

use super::pack::{PackedNode, NONE};
use crate::util::{Error, Result};

/// Summary figures for a built tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhStats {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Edges on the longest root-to-leaf path; zero for a single leaf.
    pub max_depth: usize,
    pub sah_cost: f32,
}

/// Total SAH cost: every internal node costs `traversal_cost` and every leaf
/// costs one triangle test, each weighted by its area relative to the root.
pub fn sah_cost(nodes: &[PackedNode], traversal_cost: f32) -> f32 {
    let Some(root) = nodes.first() else {
        return 0.0;
    };
    let root_area = root.bounds().surface_area();
    let inv_root_area = if root_area > 0.0 { 1.0 / root_area } else { 1.0 };

    nodes
        .iter()
        .map(|node| {
            let weight = node.bounds().surface_area() * inv_root_area;
            if node.is_leaf() {
                weight
            } else {
                traversal_cost * weight
            }
        })
        .sum()
}

/// Longest root-to-leaf path, following `index + 1` and the first child's miss.
pub fn max_depth(nodes: &[PackedNode]) -> usize {
    if nodes.is_empty() {
        return 0;
    }
    let mut deepest = 0;
    let mut stack = vec![(0usize, 0usize)];
    while let Some((i, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        if !nodes[i].is_leaf() {
            stack.push((i + 1, depth + 1));
            if let Some(second) = nodes[i + 1].miss_index() {
                stack.push((second, depth + 1));
            }
        }
    }
    deepest
}

pub fn stats(nodes: &[PackedNode], traversal_cost: f32) -> BvhStats {
    BvhStats {
        node_count: nodes.len(),
        leaf_count: nodes.iter().filter(|n| n.is_leaf()).count(),
        max_depth: max_depth(nodes),
        sah_cost: sah_cost(nodes, traversal_cost),
    }
}

/// Check every structural invariant of a packed tree over `primitive_count`
/// primitives.
pub fn validate(nodes: &[PackedNode], primitive_count: usize) -> Result<()> {
    if primitive_count == 0 {
        return Err(Error::EmptyScene);
    }
    let len = nodes.len();
    if len != 2 * primitive_count - 1 {
        return Err(Error::invalid_tree(format!(
            "expected {} nodes for {primitive_count} primitives, found {len}",
            2 * primitive_count - 1
        )));
    }

    let mut seen = vec![false; primitive_count];
    for (i, node) in nodes.iter().enumerate() {
        let bounds = node.bounds();
        if bounds.min.is_nan() || bounds.max.is_nan() || bounds.is_empty() {
            return Err(Error::invalid_tree(format!("node {i} has invalid bounds {bounds:?}")));
        }

        let forward = match node.miss_index() {
            Some(m) => m > i && m < len,
            None => node.miss == NONE,
        };
        if !forward {
            return Err(Error::invalid_tree(format!(
                "node {i} misses to {}, which is not a later node",
                node.miss
            )));
        }

        if node.is_leaf() {
            let id = usize::try_from(node.primitive)
                .ok()
                .filter(|&id| id < primitive_count)
                .ok_or_else(|| {
                    Error::invalid_tree(format!("node {i} has primitive {}", node.primitive))
                })?;
            if std::mem::replace(&mut seen[id], true) {
                return Err(Error::invalid_tree(format!("primitive {id} appears twice")));
            }
            continue;
        }

        if i + 1 >= len {
            return Err(Error::invalid_tree(format!("internal node {i} has no children")));
        }
        let first = &nodes[i + 1];
        let Some(second_index) = first.miss_index().filter(|&j| j < len) else {
            return Err(Error::invalid_tree(format!("node {} has no sibling", i + 1)));
        };
        let second = &nodes[second_index];
        if second.miss != node.miss {
            return Err(Error::invalid_tree(format!(
                "node {second_index} misses to {}, its parent {i} to {}",
                second.miss, node.miss
            )));
        }
        if !bounds.contains(&first.bounds()) || !bounds.contains(&second.bounds()) {
            return Err(Error::invalid_tree(format!(
                "node {i} does not enclose its children"
            )));
        }
    }

    if nodes[len - 1].miss != NONE {
        return Err(Error::invalid_tree("last node does not end traversal"));
    }
    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(Error::invalid_tree(format!("primitive {missing} is not in any leaf")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(min: f32, max: f32, miss: i32, primitive: i32) -> PackedNode {
        PackedNode {
            aabb_min: [min; 3],
            miss,
            aabb_max: [max; 3],
            primitive,
        }
    }

    /// root, leaf 0, leaf 1
    fn pair() -> Vec<PackedNode> {
        vec![
            node(0.0, 2.0, NONE, NONE),
            node(0.0, 1.0, 2, 0),
            node(1.0, 2.0, NONE, 1),
        ]
    }

    #[test]
    fn test_valid_pair() {
        assert!(validate(&pair(), 2).is_ok());
        assert_eq!(max_depth(&pair()), 1);
    }

    #[test]
    fn test_wrong_length() {
        assert!(matches!(validate(&pair(), 3), Err(Error::InvalidTree(_))));
        assert!(matches!(validate(&pair(), 0), Err(Error::EmptyScene)));
    }

    #[test]
    fn test_backward_miss_is_a_cycle() {
        let mut nodes = pair();
        nodes[1].miss = 0;
        let err = validate(&nodes, 2).unwrap_err();
        assert!(err.to_string().contains("not a later node"));
    }

    #[test]
    fn test_duplicate_primitive() {
        let mut nodes = pair();
        nodes[2].primitive = 0;
        let err = validate(&nodes, 2).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_child_outside_parent() {
        let mut nodes = pair();
        nodes[2].aabb_max = [3.0; 3];
        let err = validate(&nodes, 2).unwrap_err();
        assert!(err.to_string().contains("enclose"));
    }

    #[test]
    fn test_sah_cost_of_pair() {
        // root area 24, each leaf area 6, traversal 0.125
        let cost = sah_cost(&pair(), 0.125);
        assert!((cost - (0.125 + 0.25 + 0.25)).abs() < 1e-6);
    }

    #[test]
    fn test_single_leaf_stats() {
        let nodes = vec![node(0.0, 1.0, NONE, 0)];
        let s = stats(&nodes, 0.125);
        assert_eq!(s.node_count, 1);
        assert_eq!(s.leaf_count, 1);
        assert_eq!(s.max_depth, 0);
        assert!((s.sah_cost - 1.0).abs() < 1e-6);
        assert!(validate(&nodes, 1).is_ok());
    }
}
