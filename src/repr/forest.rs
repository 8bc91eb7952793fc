//! Bagged forest: a collection of trees whose outputs are averaged.

use crate::utils::Parallelism;

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    /// Forest has no trees.
    EmptyForest,
    /// A tree expects a feature index outside the forest's feature count.
    SplitIndexOutOfRange {
        tree_idx: usize,
        feature: u32,
        n_features: usize,
    },
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Bootstrap-aggregated ensemble of classification trees.
///
/// Each tree votes with its leaf probability; the forest output is the
/// unweighted mean, so it is in [0, 1] whenever leaf values are. Read-only
/// after construction and safe to score from many threads at once.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    n_features: usize,
}

impl Forest {
    pub fn new(n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Mean class-1 probability over all trees for one sample.
    ///
    /// `features` must hold `n_features` values in canonical order.
    pub fn predict_row(&self, features: &[f32]) -> f64 {
        debug_assert_eq!(features.len(), self.n_features);
        debug_assert!(!self.trees.is_empty());

        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_row(features) as f64)
            .sum();
        sum / self.trees.len() as f64
    }

    /// Predict a batch of samples (row-major `[n_samples][n_features]`),
    /// optionally in parallel.
    pub fn predict_batch(&self, rows: &[&[f32]], parallelism: Parallelism) -> Vec<f64> {
        parallelism.maybe_par_map(rows.to_vec(), |row| self.predict_row(row))
    }

    /// Validate structural invariants of every tree and the feature bounds
    /// of every split.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::EmptyForest);
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
            for node in 0..tree.n_nodes() as u32 {
                if !tree.is_leaf(node) {
                    let feature = tree.split_index(node);
                    if feature as usize >= self.n_features {
                        return Err(ForestValidationError::SplitIndexOutOfRange {
                            tree_idx,
                            feature,
                            n_features: self.n_features,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
