//! Greedy tree growing on exact Gini splits.
//!
//! [`TreeGrower`] turns one bootstrap sample into a [`Tree`]: at each node
//! it scans a random feature subset for the split with the largest Gini
//! impurity decrease, partitions the rows, and recurses until the depth,
//! sample-count, or purity stopping rules fire. Leaves store the class-1
//! fraction of the rows that reached them.
//!
//! Split semantics match traversal: a row goes left when
//! `value < threshold`. Thresholds are midpoints between adjacent distinct
//! values, nudged up to the right value when `f32` rounding would collapse
//! the midpoint onto the left one, so the grown partition always equals the
//! scanned partition.

use ndarray::ArrayView2;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::repr::Tree;

use super::sampling::FeatureSampler;

/// Stopping and sampling rules for growing a single tree.
#[derive(Debug, Clone)]
pub(crate) struct GrowerParams {
    pub max_depth: u32,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub min_gain: f64,
    /// Features considered per split.
    pub n_split_features: usize,
}

/// Best split found for one node.
#[derive(Debug, Clone, Copy)]
struct Split {
    feature: u32,
    threshold: f32,
    gain: f64,
}

/// SoA arrays under construction; frozen into a [`Tree`] when growth ends.
#[derive(Default)]
struct TreeBuffers {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    gains: Vec<f32>,
}

impl TreeBuffers {
    fn push_leaf(&mut self, value: f32) -> u32 {
        self.push_node(0, 0.0, true, value, 0.0)
    }

    fn push_split(&mut self, feature: u32, threshold: f32, value: f32, gain: f32) -> u32 {
        self.push_node(feature, threshold, false, value, gain)
    }

    fn push_node(&mut self, feature: u32, threshold: f32, leaf: bool, value: f32, gain: f32) -> u32 {
        let id = self.is_leaf.len() as u32;
        self.split_indices.push(feature);
        self.split_thresholds.push(threshold);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(leaf);
        self.leaf_values.push(value);
        self.gains.push(gain);
        id
    }

    fn set_children(&mut self, node: u32, left: u32, right: u32, default_left: bool) {
        self.left_children[node as usize] = left;
        self.right_children[node as usize] = right;
        self.default_left[node as usize] = default_left;
    }

    fn freeze(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
            self.gains,
        )
    }
}

/// Grows one tree from a bootstrap sample.
///
/// Borrows the feature matrix (feature-major `[n_features, n_samples]`) and
/// the 0/1 targets for the lifetime of the fit.
pub struct TreeGrower<'a> {
    features: ArrayView2<'a, f32>,
    targets: &'a [f32],
    params: GrowerParams,
}

impl<'a> TreeGrower<'a> {
    pub(crate) fn new(
        features: ArrayView2<'a, f32>,
        targets: &'a [f32],
        params: GrowerParams,
    ) -> Self {
        debug_assert_eq!(features.ncols(), targets.len());
        Self {
            features,
            targets,
            params,
        }
    }

    /// Grow a tree over the given bootstrap rows.
    ///
    /// `rows` is reordered in place as nodes partition it. The RNG drives
    /// per-node feature subsets; it must be the tree's own stream.
    pub fn grow(&self, rows: &mut [u32], rng: &mut Xoshiro256PlusPlus) -> Tree {
        debug_assert!(!rows.is_empty());
        let mut buffers = TreeBuffers::default();
        let mut feature_sampler =
            FeatureSampler::new(self.features.nrows(), self.params.n_split_features);
        let mut scratch: Vec<(f32, f32)> = Vec::with_capacity(rows.len());
        self.grow_node(rows, 0, rng, &mut feature_sampler, &mut scratch, &mut buffers);
        buffers.freeze()
    }

    fn grow_node(
        &self,
        rows: &mut [u32],
        depth: u32,
        rng: &mut Xoshiro256PlusPlus,
        feature_sampler: &mut FeatureSampler,
        scratch: &mut Vec<(f32, f32)>,
        out: &mut TreeBuffers,
    ) -> u32 {
        let n = rows.len();
        let positives: f64 = rows
            .iter()
            .map(|&row| self.targets[row as usize] as f64)
            .sum();
        let fraction = (positives / n as f64) as f32;

        let pure = positives == 0.0 || positives == n as f64;
        if depth >= self.params.max_depth || n < self.params.min_samples_split || pure {
            return out.push_leaf(fraction);
        }

        let candidates: Vec<u32> = feature_sampler.sample_for_node(rng).to_vec();
        let best = candidates
            .iter()
            .filter_map(|&feature| self.best_split_on(feature, rows, positives, scratch))
            .fold(None::<Split>, |best, split| match best {
                Some(b) if b.gain >= split.gain => Some(b),
                _ => Some(split),
            });

        let Some(split) = best else {
            return out.push_leaf(fraction);
        };

        let node = out.push_split(split.feature, split.threshold, fraction, split.gain as f32);

        let mid = partition_rows(rows, |row| {
            self.features[[split.feature as usize, row as usize]] < split.threshold
        });
        debug_assert!(mid > 0 && mid < n, "split must separate rows");
        let (left_rows, right_rows) = rows.split_at_mut(mid);

        let default_left = left_rows.len() >= right_rows.len();
        let left = self.grow_node(left_rows, depth + 1, rng, feature_sampler, scratch, out);
        let right = self.grow_node(right_rows, depth + 1, rng, feature_sampler, scratch, out);
        out.set_children(node, left, right, default_left);
        node
    }

    /// Scan one feature for the best Gini split over `rows`.
    ///
    /// Returns `None` when the feature is constant over the node or no
    /// split satisfies `min_samples_leaf` and `min_gain`.
    fn best_split_on(
        &self,
        feature: u32,
        rows: &[u32],
        positives: f64,
        scratch: &mut Vec<(f32, f32)>,
    ) -> Option<Split> {
        let n = rows.len();
        scratch.clear();
        scratch.extend(rows.iter().map(|&row| {
            (
                self.features[[feature as usize, row as usize]],
                self.targets[row as usize],
            )
        }));
        scratch.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let total = n as f64;
        let parent_impurity = gini(positives, total);

        let min_leaf = self.params.min_samples_leaf;
        let mut left_positives = 0.0f64;
        let mut best: Option<Split> = None;

        for i in 0..n - 1 {
            left_positives += scratch[i].1 as f64;
            let left_count = (i + 1) as f64;

            if scratch[i].0 == scratch[i + 1].0 {
                continue;
            }
            if i + 1 < min_leaf || n - (i + 1) < min_leaf {
                continue;
            }

            let right_count = total - left_count;
            let right_positives = positives - left_positives;
            let weighted = (left_count / total) * gini(left_positives, left_count)
                + (right_count / total) * gini(right_positives, right_count);
            let gain = parent_impurity - weighted;

            if gain > self.params.min_gain && best.map_or(true, |b| gain > b.gain) {
                best = Some(Split {
                    feature,
                    threshold: midpoint_threshold(scratch[i].0, scratch[i + 1].0),
                    gain,
                });
            }
        }

        best
    }
}

/// Gini impurity of a node with `positives` of `total` samples.
#[inline]
fn gini(positives: f64, total: f64) -> f64 {
    let p = positives / total;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Threshold strictly above `low` and at most `high`, so that `value <
/// threshold` reproduces the scanned partition exactly.
#[inline]
fn midpoint_threshold(low: f32, high: f32) -> f32 {
    let mid = ((low as f64 + high as f64) / 2.0) as f32;
    if mid > low {
        mid
    } else {
        high
    }
}

/// Partition `rows` in place so rows satisfying `predicate` come first.
/// Returns the partition point.
fn partition_rows(rows: &mut [u32], predicate: impl Fn(u32) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..rows.len() {
        if predicate(rows[i]) {
            rows.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
