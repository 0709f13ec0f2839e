//! Top-down binary tree builder.
//!
//! Constructs an arena of exactly `2N - 1` nodes from a leaf table.
//! Ranges of up to `median_split_max` primitives are split at the median
//! along the node's dominant axis; larger ranges use a binned Surface Area
//! Heuristic split. Every split produces two non-empty children, and a
//! single-primitive range always becomes a leaf.

use super::leaf::LeafTable;
use super::node::TreeNode;
use super::params::BuildParams;
use crate::util::Aabb;

/// SAH bucket for evaluating split candidates.
#[derive(Clone, Copy)]
struct Bucket {
    bounds: Aabb,
    count: usize,
}

impl Bucket {
    const EMPTY: Self = Self {
        bounds: Aabb::EMPTY,
        count: 0,
    };
}

/// Pending range `[begin, end)` of the working order, to be written to `node`.
struct Task {
    node: u32,
    begin: usize,
    end: usize,
}

/// Maps centroid coordinates on one axis to bucket indices.
#[derive(Clone, Copy)]
struct Binning {
    axis: usize,
    min: f32,
    /// `bucket_count / extent`, or zero when all centroids coincide.
    scale: f32,
    bucket_count: usize,
}

impl Binning {
    fn new(centroid_bounds: &Aabb, axis: usize, bucket_count: usize) -> Self {
        let min = centroid_bounds.min[axis];
        let extent = centroid_bounds.max[axis] - min;
        // Zero extent puts everything in bucket 0 instead of dividing by zero.
        let scale = if extent > 0.0 {
            bucket_count as f32 / extent
        } else {
            0.0
        };
        Self {
            axis,
            min,
            scale,
            bucket_count,
        }
    }

    #[inline]
    fn bucket(&self, centroid: crate::util::Vec3) -> usize {
        let b = ((centroid[self.axis] - self.min) * self.scale) as usize;
        // A centroid exactly on the upper bound lands one past the end.
        b.min(self.bucket_count - 1)
    }
}

/// Split counters, reported once the build finishes.
#[derive(Debug, Default, Clone, Copy)]
struct SplitCounts {
    median: usize,
    sah: usize,
    degenerate: usize,
}

/// Builds the intermediate tree for one leaf table.
///
/// The builder permutes a working order of primitive ids in place; the leaf
/// table itself is never modified.
pub struct Builder<'a> {
    leaves: &'a LeafTable,
    params: BuildParams,
    order: Vec<u32>,
    nodes: Vec<TreeNode>,
    /// Number of arena slots handed out so far; children take the next two.
    allocated: u32,
    buckets: Vec<Bucket>,
    scratch: Vec<u32>,
    counts: SplitCounts,
}

impl<'a> Builder<'a> {
    pub fn new(leaves: &'a LeafTable, params: BuildParams) -> Self {
        let n = leaves.len();
        Self {
            leaves,
            params,
            order: (0..n as u32).collect(),
            nodes: vec![TreeNode::PLACEHOLDER; 2 * n - 1],
            allocated: 1,
            buckets: vec![Bucket::EMPTY; params.bucket_count],
            scratch: Vec::with_capacity(n),
            counts: SplitCounts::default(),
        }
    }

    /// Run the build. `nodes[0]` is the root covering every primitive.
    pub fn build(mut self) -> Vec<TreeNode> {
        let n = self.order.len();

        // Explicit stack; right child is pushed first so the left subtree
        // is finished before the right one starts.
        let mut stack = vec![Task {
            node: 0,
            begin: 0,
            end: n,
        }];

        while let Some(task) = stack.pop() {
            let count = task.end - task.begin;
            assert!(count > 0, "empty range reached the builder");

            let bounds = self.range_bounds(task.begin, task.end);

            if count == 1 {
                let primitive = self.order[task.begin];
                self.nodes[task.node as usize] = TreeNode::leaf(bounds, primitive);
                continue;
            }

            let mid = if count == 2 {
                // Two primitives keep their current order; nothing to compare.
                task.begin + 1
            } else if count <= self.params.median_split_max {
                self.counts.median += 1;
                self.median_split(task.begin, task.end, bounds.dominant_axis())
            } else {
                self.sah_split(task.begin, task.end, &bounds)
            };
            debug_assert!(task.begin < mid && mid < task.end);

            let first = self.allocate_pair();
            self.nodes[task.node as usize] = TreeNode::internal(bounds, first);

            stack.push(Task {
                node: first + 1,
                begin: mid,
                end: task.end,
            });
            stack.push(Task {
                node: first,
                begin: task.begin,
                end: mid,
            });
        }

        assert_eq!(
            self.allocated as usize,
            self.nodes.len(),
            "builder did not fill the 2N - 1 node arena"
        );
        tracing::debug!(
            nodes = self.nodes.len(),
            median_splits = self.counts.median,
            sah_splits = self.counts.sah,
            degenerate_splits = self.counts.degenerate,
            "tree built"
        );

        self.nodes
    }

    /// Hand out the next two consecutive arena slots.
    fn allocate_pair(&mut self) -> u32 {
        let first = self.allocated;
        self.allocated += 2;
        assert!(
            self.allocated as usize <= self.nodes.len(),
            "node arena overflow"
        );
        first
    }

    fn range_bounds(&self, begin: usize, end: usize) -> Aabb {
        self.order[begin..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, &id| acc.union(self.leaves.bounds(id)))
    }

    /// Sort the range by centroid along `axis` and split it in half.
    fn median_split(&mut self, begin: usize, end: usize, axis: usize) -> usize {
        let leaves = self.leaves;
        self.order[begin..end]
            .sort_by(|&a, &b| leaves.centroid(a)[axis].total_cmp(&leaves.centroid(b)[axis]));
        begin + (end - begin) / 2
    }

    /// Binned SAH split along the node's dominant axis.
    ///
    /// Falls back to a median split when every centroid lands in one bucket.
    fn sah_split(&mut self, begin: usize, end: usize, bounds: &Aabb) -> usize {
        let leaves = self.leaves;
        let bucket_count = self.params.bucket_count;
        let axis = bounds.dominant_axis();

        let centroid_bounds = self.order[begin..end].iter().fold(Aabb::EMPTY, |mut acc, &id| {
            acc.grow_point(leaves.centroid(id));
            acc
        });
        let binning = Binning::new(&centroid_bounds, axis, bucket_count);

        self.buckets.fill(Bucket::EMPTY);
        for &id in &self.order[begin..end] {
            let bucket = &mut self.buckets[binning.bucket(leaves.centroid(id))];
            bucket.bounds.grow(leaves.bounds(id));
            bucket.count += 1;
        }

        let Some(split) = self.best_split(bounds) else {
            self.counts.degenerate += 1;
            tracing::trace!(begin, end, axis, "degenerate centroid bounds, median fallback");
            return self.median_split(begin, end, axis);
        };
        self.counts.sah += 1;

        // Stable partition: buckets <= split go left, relative order kept.
        let range = &mut self.order[begin..end];
        self.scratch.clear();
        self.scratch.extend(
            range
                .iter()
                .copied()
                .filter(|&id| binning.bucket(leaves.centroid(id)) <= split),
        );
        let left_count = self.scratch.len();
        self.scratch.extend(
            range
                .iter()
                .copied()
                .filter(|&id| binning.bucket(leaves.centroid(id)) > split),
        );
        range.copy_from_slice(&self.scratch);

        begin + left_count
    }

    /// Cheapest split point over the filled buckets.
    ///
    /// Split `i` puts buckets `0..=i` left and `i + 1..` right. Candidates
    /// with an empty side are skipped. Ties keep the lowest index.
    fn best_split(&self, bounds: &Aabb) -> Option<usize> {
        let splits = self.buckets.len() - 1;
        let parent_area = bounds.surface_area();
        let inv_parent_area = if parent_area > 0.0 {
            1.0 / parent_area
        } else {
            1.0
        };

        // Sweep from right: suffix areas and counts
        let mut right_area = vec![0.0f32; splits];
        let mut right_count = vec![0usize; splits];
        let mut sweep = Aabb::EMPTY;
        let mut sweep_count = 0;
        for i in (0..splits).rev() {
            sweep.grow(&self.buckets[i + 1].bounds);
            sweep_count += self.buckets[i + 1].count;
            right_area[i] = sweep.surface_area();
            right_count[i] = sweep_count;
        }

        // Sweep from left and evaluate SAH cost
        let mut best: Option<(usize, f32)> = None;
        sweep = Aabb::EMPTY;
        sweep_count = 0;
        for i in 0..splits {
            sweep.grow(&self.buckets[i].bounds);
            sweep_count += self.buckets[i].count;
            if sweep_count == 0 || right_count[i] == 0 {
                continue;
            }

            let cost = self.params.traversal_cost
                + (sweep_count as f32 * sweep.surface_area()
                    + right_count[i] as f32 * right_area[i])
                    * inv_parent_area;

            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((i, cost));
            }
        }

        best.map(|(split, _)| split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Triangle;
    use crate::util::Vec3;

    fn make_tri(cx: f32, cy: f32, cz: f32) -> Triangle {
        Triangle::new(
            Vec3::new(cx - 0.5, cy - 0.5, cz),
            Vec3::new(cx + 0.5, cy - 0.5, cz),
            Vec3::new(cx, cy + 0.5, cz),
        )
    }

    fn build(tris: &[Triangle]) -> Vec<TreeNode> {
        let leaves = LeafTable::new(tris).unwrap();
        Builder::new(&leaves, BuildParams::default()).build()
    }

    fn leaf_ids(nodes: &[TreeNode], node: u32) -> Vec<u32> {
        let n = &nodes[node as usize];
        match n.children() {
            None => vec![n.primitive],
            Some((a, b)) => {
                let mut ids = leaf_ids(nodes, a);
                ids.extend(leaf_ids(nodes, b));
                ids
            }
        }
    }

    #[test]
    fn test_single_triangle() {
        let nodes = build(&[make_tri(0.0, 0.0, 0.0)]);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].primitive, 0);
    }

    #[test]
    fn test_two_triangles_keep_order() {
        // Input order is kept even though the second is left of the first.
        let nodes = build(&[make_tri(5.0, 0.0, 0.0), make_tri(0.0, 0.0, 0.0)]);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].children(), Some((1, 2)));
        assert_eq!(nodes[1].primitive, 0);
        assert_eq!(nodes[2].primitive, 1);
    }

    #[test]
    fn test_three_triangles_median() {
        let nodes = build(&[
            make_tri(4.0, 0.0, 0.0),
            make_tri(0.0, 0.0, 0.0),
            make_tri(2.0, 0.0, 0.0),
        ]);
        assert_eq!(nodes.len(), 5);
        // Sorted along x: [1, 2, 0]; split at 3/2 = 1 -> left leaf, right pair
        assert_eq!(nodes[1].primitive, 1);
        assert_eq!(leaf_ids(&nodes, 2), vec![2, 0]);
    }

    #[test]
    fn test_four_triangles_two_pairs() {
        let nodes = build(&[
            make_tri(3.0, 0.0, 0.0),
            make_tri(1.0, 0.0, 0.0),
            make_tri(0.0, 0.0, 0.0),
            make_tri(2.0, 0.0, 0.0),
        ]);
        assert_eq!(nodes.len(), 7);
        let mut left = leaf_ids(&nodes, 1);
        left.sort();
        assert_eq!(left, vec![1, 2]);
        let mut right = leaf_ids(&nodes, 2);
        right.sort();
        assert_eq!(right, vec![0, 3]);
    }

    #[test]
    fn test_children_allocated_in_pairs() {
        let tris: Vec<Triangle> = (0..37).map(|i| make_tri(i as f32 * 1.5, (i % 5) as f32, 0.0)).collect();
        let nodes = build(&tris);
        assert_eq!(nodes.len(), 2 * 37 - 1);

        let mut referenced = vec![false; nodes.len()];
        referenced[0] = true;
        for node in &nodes {
            if let Some((a, b)) = node.children() {
                assert_eq!(b, a + 1);
                assert!(node.bounds.contains(&nodes[a as usize].bounds));
                assert!(node.bounds.contains(&nodes[b as usize].bounds));
                referenced[a as usize] = true;
                referenced[b as usize] = true;
            }
        }
        assert!(referenced.iter().all(|&r| r), "every node is reachable");

        let mut ids = leaf_ids(&nodes, 0);
        ids.sort();
        assert_eq!(ids, (0..37).collect::<Vec<u32>>());
    }

    #[test]
    fn test_sah_separates_outlier() {
        let nodes = build(&[
            make_tri(0.0, 0.0, 0.0),
            make_tri(1.0, 0.0, 0.0),
            make_tri(100.0, 0.0, 0.0),
            make_tri(0.0, 1.0, 0.0),
            make_tri(1.0, 1.0, 0.0),
        ]);
        let mut left = leaf_ids(&nodes, 1);
        left.sort();
        assert_eq!(left, vec![0, 1, 3, 4]);
        assert_eq!(leaf_ids(&nodes, 2), vec![2]);
    }

    #[test]
    fn test_coincident_centroids_fall_back() {
        let tris: Vec<Triangle> = (0..9).map(|_| make_tri(1.0, 2.0, 3.0)).collect();
        let nodes = build(&tris);
        assert_eq!(nodes.len(), 17);
        for node in &nodes {
            assert!(!node.bounds.min.is_nan());
            assert!(!node.bounds.max.is_nan());
        }
        // Median fallback halves the range: 9 -> 4 + 5
        assert_eq!(leaf_ids(&nodes, 1).len(), 4);
        assert_eq!(leaf_ids(&nodes, 2).len(), 5);
    }

    #[test]
    fn test_binning_clamps_upper_bound() {
        let cb = Aabb::new(Vec3::ZERO, Vec3::new(12.0, 0.0, 0.0));
        let binning = Binning::new(&cb, 0, 12);
        assert_eq!(binning.bucket(Vec3::ZERO), 0);
        assert_eq!(binning.bucket(Vec3::new(5.5, 0.0, 0.0)), 5);
        assert_eq!(binning.bucket(Vec3::new(12.0, 0.0, 0.0)), 11);

        let flat = Binning::new(&Aabb::from_point(Vec3::ONE, 0.0), 1, 12);
        assert_eq!(flat.bucket(Vec3::ONE), 0);
    }
}
