//! TreeSHAP explainer for the bagged forest.
//!
//! Exact SHAP values in polynomial time. Per-tree contributions and the
//! per-tree expected values are averaged with the same 1/n_trees weight the
//! forest applies to predictions, so the additivity identity holds for the
//! ensemble as a whole:
//!
//! `base_value + sum(shap_values(x)) == forest.predict_row(x)`

use crate::repr::{Forest, NodeId, Tree};

use super::path::PathState;
use super::ExplainError;

/// TreeSHAP explainer borrowing a fitted forest.
#[derive(Debug)]
pub struct TreeExplainer<'a> {
    forest: &'a Forest,
    /// Cover-weighted expected prediction over the training set.
    base_value: f64,
}

impl<'a> TreeExplainer<'a> {
    /// Create an explainer for the given forest.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::MissingNodeStats`] if any tree lacks cover
    /// statistics. Trees fitted by the trainer always carry them; the guard
    /// protects hand-assembled forests.
    pub fn new(forest: &'a Forest) -> Result<Self, ExplainError> {
        for tree in forest.trees() {
            if !tree.has_covers() {
                return Err(ExplainError::MissingNodeStats);
            }
        }

        let base_value = forest
            .trees()
            .map(expected_value)
            .sum::<f64>()
            / forest.n_trees() as f64;

        Ok(Self { forest, base_value })
    }

    /// Create an explainer reusing an already-computed base value.
    ///
    /// Lets a model that cached its baseline at fit time explain requests
    /// without re-deriving the expectation from the leaves each call.
    pub fn with_base_value(forest: &'a Forest, base_value: f64) -> Result<Self, ExplainError> {
        for tree in forest.trees() {
            if !tree.has_covers() {
                return Err(ExplainError::MissingNodeStats);
            }
        }
        Ok(Self { forest, base_value })
    }

    /// The expected prediction over the training set (attribution zero
    /// point).
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Exact SHAP values for one sample, one entry per feature.
    ///
    /// `features` must hold `forest.n_features()` values in canonical
    /// order.
    pub fn shap_values(&self, features: &[f32]) -> Vec<f64> {
        debug_assert_eq!(features.len(), self.forest.n_features());

        let mut phi = vec![0.0f64; self.forest.n_features()];
        for tree in self.forest.trees() {
            let path = PathState::with_capacity(tree.depth());
            self.recurse(tree, features, &mut phi, 0, &path, 1.0, 1.0, -1);
        }

        let scale = 1.0 / self.forest.n_trees() as f64;
        for value in &mut phi {
            *value *= scale;
        }
        phi
    }

    /// TreeSHAP recursion (Lundberg et al. 2020, Algorithm 2).
    ///
    /// `parent_*` describe the branch that led here: the cover fraction of
    /// background paths (`zero`), whether the sample itself came this way
    /// (`one`), and the split feature (-1 at the root).
    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &self,
        tree: &Tree,
        features: &[f32],
        phi: &mut [f64],
        node: NodeId,
        parent_path: &PathState,
        parent_zero: f64,
        parent_one: f64,
        parent_feature: i32,
    ) {
        let mut path = parent_path.clone();
        path.extend(parent_zero, parent_one, parent_feature);

        if tree.is_leaf(node) {
            let value = tree.leaf_value(node) as f64;
            for i in 1..path.len() {
                let weight = path.unwound_sum(i);
                let element = path.element(i);
                phi[element.feature as usize] +=
                    weight * (element.one_fraction - element.zero_fraction) * value;
            }
            return;
        }

        let covers = tree.covers().expect("explainer requires covers");
        let feature = tree.split_index(node);
        let value = features[feature as usize];
        let left = tree.left_child(node);
        let right = tree.right_child(node);

        let go_left = if value.is_nan() {
            tree.default_left(node)
        } else {
            value < tree.split_threshold(node)
        };
        let (hot, cold) = if go_left { (left, right) } else { (right, left) };

        let node_cover = covers[node as usize] as f64;
        let hot_zero = covers[hot as usize] as f64 / node_cover;
        let cold_zero = covers[cold as usize] as f64 / node_cover;

        // A feature revisited deeper on the path is unwound first; its
        // previous fractions multiply into this split's.
        let mut incoming_zero = 1.0;
        let mut incoming_one = 1.0;
        if let Some(found) = path.find(feature as i32) {
            incoming_zero = path.element(found).zero_fraction;
            incoming_one = path.element(found).one_fraction;
            path.unwind(found);
        }

        self.recurse(
            tree,
            features,
            phi,
            hot,
            &path,
            incoming_zero * hot_zero,
            incoming_one,
            feature as i32,
        );
        self.recurse(
            tree,
            features,
            phi,
            cold,
            &path,
            incoming_zero * cold_zero,
            0.0,
            feature as i32,
        );
    }
}

/// Cover-weighted mean of leaf values: the tree's expected prediction over
/// the rows its covers were computed from.
fn expected_value(tree: &Tree) -> f64 {
    let covers = tree.covers().expect("explainer requires covers");
    let root_cover = covers[0] as f64;
    let mut sum = 0.0;
    for node in 0..tree.n_nodes() as u32 {
        if tree.is_leaf(node) {
            sum += covers[node as usize] as f64 * tree.leaf_value(node) as f64;
        }
    }
    sum / root_cover
}
