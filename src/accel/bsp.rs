use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::{
    geometry::{Bounds3f, Ray},
    parallel,
    primitives::{PrimRef, Primitive},
    Float,
};

// If the number of prims to split up is greater than this, run the two
// subtree builds in parallel. Otherwise just run in sequence.
const MIN_PRIMS_TO_SPLIT_PARALLEL: usize = 32 * 1024;

const KIND_NEAREST: u64 = 0;
const KIND_FURTHEST: u64 = 1;

/// A spatial BSP tree over one primitive list.
///
/// Unlike an ordinary ray-tracing index it answers both the nearest-entry
/// and the furthest-exit query, which CSG resolution demands. Primitives
/// straddling a split plane are referenced from every child they overlap;
/// a per-primitive mailbox keyed on `(ray.counter, query kind)` keeps each
/// query from testing such a primitive twice.
#[derive(Debug)]
pub struct BspTree {
    prims: Vec<PrimRef>,
    nodes: Vec<BspNode>,
    bounds: Bounds3f,
    mailbox: Vec<AtomicU64>,
}

#[derive(Debug)]
enum BspNode {
    Interior {
        axis: usize,
        bounds: Bounds3f,
        // Below-split child first
        children: [usize; 2],
    },
    Leaf {
        bounds: Bounds3f,
        prims: Vec<u32>,
    },
}

impl BspNode {
    fn bounds(&self) -> Bounds3f {
        match self {
            Self::Interior { bounds, .. } => *bounds,
            Self::Leaf { bounds, .. } => *bounds,
        }
    }
}

impl BspTree {
    /// Build a tree over `prims` by recursive spatial subdivision: split
    /// axis is the longest extent of the node's bound, split position the
    /// median of member centroids along it. Recursion stops at `max_depth`,
    /// below `min_prims`, or when a split fails to separate.
    pub fn build(prims: Vec<PrimRef>, max_depth: usize, min_prims: usize) -> Self {
        assert!(!prims.is_empty(), "BSP build requires at least one primitive");

        let prim_bounds: Vec<Bounds3f> = prims
            .iter()
            .map(|prim| prim.read().unwrap().bounds())
            .collect();
        let bounds = prim_bounds
            .iter()
            .copied()
            .fold(Bounds3f::EMPTY, Bounds3f::union);

        let indices: Vec<u32> = (0..prims.len() as u32).collect();
        let root_result = build_recursive(indices, &prim_bounds, bounds, max_depth, min_prims);

        let n_nodes = root_result.n_nodes;
        let nodes = flatten(root_result.node, n_nodes);
        debug!(
            "built BSP over {} primitives: {} nodes, {} leaf references",
            prims.len(),
            nodes.len(),
            nodes
                .iter()
                .map(|node| match node {
                    BspNode::Leaf { prims, .. } => prims.len(),
                    BspNode::Interior { .. } => 0,
                })
                .sum::<usize>(),
        );

        let mailbox = (0..prims.len()).map(|_| AtomicU64::new(u64::MAX)).collect();

        Self {
            prims,
            nodes,
            bounds,
            mailbox,
        }
    }

    pub fn bounds(&self) -> Bounds3f {
        self.bounds
    }

    pub fn intersect_nearest(&self, ray: &mut Ray) -> bool {
        self.visit_nearest(0, ray)
    }

    pub fn intersect_furthest(&self, ray: &mut Ray) -> bool {
        self.visit_furthest(0, ray)
    }

    /// Front-to-back traversal; each committed hit shrinks the slab window
    /// and prunes boxes that start beyond it.
    fn visit_nearest(&self, node: usize, ray: &mut Ray) -> bool {
        if self.nodes[node].bounds().intersect_p(ray, ray.t).is_none() {
            return false;
        }

        match &self.nodes[node] {
            BspNode::Leaf { prims, .. } => {
                let mut any = false;
                for &i in prims {
                    if self.already_tested(i, ray.counter, KIND_NEAREST) {
                        continue;
                    }
                    any |= self.prims[i as usize].read().unwrap().intersect_nearest(ray);
                }
                any
            }
            BspNode::Interior { axis, children, .. } => {
                let [below, above] = *children;
                let (front, back) = if ray.dir[*axis] >= 0.0 {
                    (below, above)
                } else {
                    (above, below)
                };

                let mut any = self.visit_nearest(front, ray);
                any |= self.visit_nearest(back, ray);
                any
            }
        }
    }

    /// Back-to-front traversal; the running best only grows, and boxes
    /// whose slab window ends before it are pruned.
    fn visit_furthest(&self, node: usize, ray: &mut Ray) -> bool {
        match self.nodes[node].bounds().intersect_p(ray, Float::INFINITY) {
            None => return false,
            Some((_, t1)) if ray.hit.is_some() && t1 <= ray.t => return false,
            Some(_) => {}
        }

        match &self.nodes[node] {
            BspNode::Leaf { prims, .. } => {
                let mut any = false;
                for &i in prims {
                    if self.already_tested(i, ray.counter, KIND_FURTHEST) {
                        continue;
                    }
                    any |= self.prims[i as usize]
                        .read()
                        .unwrap()
                        .intersect_furthest(ray);
                }
                any
            }
            BspNode::Interior { axis, children, .. } => {
                let [below, above] = *children;
                let (front, back) = if ray.dir[*axis] >= 0.0 {
                    (below, above)
                } else {
                    (above, below)
                };

                let mut any = self.visit_furthest(back, ray);
                any |= self.visit_furthest(front, ray);
                any
            }
        }
    }

    fn already_tested(&self, prim: u32, counter: u32, kind: u64) -> bool {
        let tag = ((counter as u64) << 1) | kind;
        self.mailbox[prim as usize].swap(tag, Ordering::Relaxed) == tag
    }
}

struct BspBuildResult {
    node: BspBuildNode,
    n_nodes: usize,
}

enum BspBuildNode {
    Interior {
        axis: usize,
        bounds: Bounds3f,
        left: Box<BspBuildNode>,
        right: Box<BspBuildNode>,
    },
    Leaf {
        bounds: Bounds3f,
        prims: Vec<u32>,
    },
}

fn build_recursive(
    indices: Vec<u32>,
    prim_bounds: &[Bounds3f],
    node_bounds: Bounds3f,
    depth_left: usize,
    min_prims: usize,
) -> BspBuildResult {
    let create_leaf = |indices: Vec<u32>| BspBuildResult {
        node: BspBuildNode::Leaf {
            bounds: node_bounds,
            prims: indices,
        },
        n_nodes: 1,
    };

    if depth_left == 0 || indices.len() < min_prims {
        return create_leaf(indices);
    }

    // Split along the widest axis, at the median of member centroids
    let axis = node_bounds.max_extent();
    let mut centroids: Vec<Float> = indices
        .iter()
        .map(|&i| prim_bounds[i as usize].centroid()[axis])
        .collect();
    let mid = centroids.len() / 2;
    let (_, split, _) = centroids.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let split = *split;

    // A primitive goes into every child its bound overlaps
    let left: Vec<u32> = indices
        .iter()
        .copied()
        .filter(|&i| prim_bounds[i as usize].p_min[axis] <= split)
        .collect();
    let right: Vec<u32> = indices
        .iter()
        .copied()
        .filter(|&i| prim_bounds[i as usize].p_max[axis] >= split)
        .collect();

    // The plane failed to separate anything; subdividing further would
    // recurse forever on the same set.
    if left.len() == indices.len() && right.len() == indices.len() {
        return create_leaf(indices);
    }
    if left.is_empty() || right.is_empty() {
        return create_leaf(indices);
    }

    let mut left_bounds = node_bounds;
    left_bounds.p_max[axis] = split;
    let mut right_bounds = node_bounds;
    right_bounds.p_min[axis] = split;

    let num_prims = indices.len();
    let build_left =
        || build_recursive(left, prim_bounds, left_bounds, depth_left - 1, min_prims);
    let build_right =
        || build_recursive(right, prim_bounds, right_bounds, depth_left - 1, min_prims);
    let (left_result, right_result) = if num_prims > MIN_PRIMS_TO_SPLIT_PARALLEL {
        parallel::join(build_left, build_right)
    } else {
        (build_left(), build_right())
    };

    BspBuildResult {
        node: BspBuildNode::Interior {
            axis,
            bounds: node_bounds,
            left: Box::new(left_result.node),
            right: Box::new(right_result.node),
        },
        n_nodes: left_result.n_nodes + right_result.n_nodes + 1,
    }
}

/// Convert the build tree into a compact preorder array; interior nodes
/// carry the indices of both children.
fn flatten(root: BspBuildNode, n_nodes: usize) -> Vec<BspNode> {
    fn emit(node: BspBuildNode, nodes: &mut Vec<BspNode>) -> usize {
        match node {
            BspBuildNode::Leaf { bounds, prims } => {
                nodes.push(BspNode::Leaf { bounds, prims });
                nodes.len() - 1
            }
            BspBuildNode::Interior {
                axis,
                bounds,
                left,
                right,
            } => {
                let idx = nodes.len();
                nodes.push(BspNode::Interior {
                    axis,
                    bounds,
                    children: [0, 0],
                });
                let left_idx = emit(*left, nodes);
                let right_idx = emit(*right, nodes);
                if let BspNode::Interior { children, .. } = &mut nodes[idx] {
                    *children = [left_idx, right_idx];
                }
                idx
            }
        }
    }

    let mut nodes = Vec::with_capacity(n_nodes);
    emit(root, &mut nodes);

    nodes
}
