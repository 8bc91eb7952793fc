//! Forest trainer: bootstrap, grow, attach covers.
//!
//! [`ForestTrainer::train`] grows `n_trees` independent trees. Each tree
//! owns an RNG stream derived from `(seed, tree_index)`, so the result is
//! identical whether trees are grown sequentially or in parallel.
//!
//! After a tree is grown on its bootstrap sample, its per-node cover
//! statistics are recomputed by routing the **full** training set through
//! it. The explainer's background expectation is then exactly the tree's
//! mean prediction over the training set, which is what the service caches
//! as the baseline. Every node keeps a non-zero cover: each kept node holds
//! at least one bootstrap row, and that row is itself a training row that
//! retraces the same path.

use ndarray::ArrayView2;

use crate::repr::{Forest, Tree};
use crate::utils::Parallelism;

use super::config::ForestConfig;
use super::grower::{GrowerParams, TreeGrower};
use super::logger::TrainingLogger;
use super::sampling::{tree_rng, BootstrapSampler};

/// Trainer for the bagged ensemble.
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train a forest from a feature-major matrix `[n_features, n_samples]`
    /// and 0/1 targets.
    ///
    /// The caller guarantees at least one sample of each class; the class
    /// diversity check lives at the model boundary where it maps to a typed
    /// error.
    pub fn train<'a>(
        &self,
        features: ArrayView2<'a, f32>,
        targets: &'a [f32],
        parallelism: Parallelism,
    ) -> Forest {
        let n_features = features.nrows();
        let n_samples = features.ncols();
        debug_assert_eq!(n_samples, targets.len());
        debug_assert!(n_samples > 0);

        let grower_params = GrowerParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            min_gain: self.config.min_gain,
            n_split_features: self.config.feature_sampling.subset_size(n_features),
        };
        let grower = TreeGrower::new(features, targets, grower_params);
        let bootstrap = BootstrapSampler::new(n_samples);
        let logger = TrainingLogger::new(self.config.verbosity);

        logger.start_training(self.config.n_trees as usize, n_samples);

        let trees: Vec<Tree> =
            parallelism.maybe_par_map(0..self.config.n_trees, |tree_index| {
                let mut rng = tree_rng(self.config.seed, tree_index);
                let mut rows = bootstrap.sample(&mut rng);
                let tree = grower.grow(&mut rows, &mut rng);
                logger.tree_grown(tree_index, tree.n_nodes());
                let covers = compute_covers(&tree, features);
                tree.with_covers(covers)
            });

        let mut forest = Forest::new(n_features);
        for tree in trees {
            forest.push_tree(tree);
        }

        logger.finish_training(forest.n_trees());
        forest
    }
}

/// Route every training sample through the tree, counting arrivals at each
/// node along its root-to-leaf path.
fn compute_covers(tree: &Tree, features: ArrayView2<'_, f32>) -> Vec<f32> {
    let mut covers = vec![0.0f32; tree.n_nodes()];
    let n_features = features.nrows();
    let mut sample = vec![0.0f32; n_features];

    for col in 0..features.ncols() {
        for (feature, value) in sample.iter_mut().enumerate() {
            *value = features[[feature, col]];
        }

        let mut node = 0u32;
        loop {
            covers[node as usize] += 1.0;
            if tree.is_leaf(node) {
                break;
            }
            let value = sample[tree.split_index(node) as usize];
            node = if value < tree.split_threshold(node) {
                tree.left_child(node)
            } else {
                tree.right_child(node)
            };
        }
    }

    covers
}
