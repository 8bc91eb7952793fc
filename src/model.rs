//! The trained risk model.
//!
//! [`RiskModel`] wraps the fitted forest with its configuration and the
//! cached baseline. It is read-only after [`fit`](RiskModel::fit): scoring
//! and explaining borrow `&self` and are safe to call from any number of
//! threads concurrently.

use ndarray::ArrayView2;

use crate::data::TrainingSet;
use crate::explain::{Attributions, ExplainError, TreeExplainer};
use crate::features::{FeatureVector, N_FEATURES};
use crate::repr::Forest;
use crate::training::{ForestConfig, ForestTrainer};
use crate::utils::run_with_threads;

// =============================================================================
// FitError
// =============================================================================

/// Training failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// Fewer than two distinct outcome classes in the training set. A
    /// single-class (or empty) set cannot produce a probability estimate.
    #[error("training set needs both outcome classes, got {negatives} negative / {positives} positive examples")]
    InsufficientData { negatives: usize, positives: usize },
}

// =============================================================================
// RiskModel
// =============================================================================

/// Fitted diabetes risk classifier with cached attribution baseline.
pub struct RiskModel {
    forest: Forest,
    config: ForestConfig,
    /// Expected prediction over the training set, cached at fit time.
    baseline: f64,
    n_training_examples: usize,
}

impl RiskModel {
    /// Fit a model from a training set.
    ///
    /// Deterministic for a fixed `config.seed` and training set. The
    /// attribution baseline is computed here, once, and cached for the
    /// model's lifetime.
    ///
    /// # Errors
    ///
    /// [`FitError::InsufficientData`] when the set lacks one of the two
    /// outcome classes.
    pub fn fit(training: &TrainingSet, config: ForestConfig) -> Result<Self, FitError> {
        if !training.has_both_classes() {
            let (negatives, positives) = training.class_counts();
            return Err(FitError::InsufficientData {
                negatives,
                positives,
            });
        }

        let features = training.feature_matrix();
        let targets = training.targets();

        let trainer = ForestTrainer::new(config.clone());
        let forest = run_with_threads(config.n_threads, |parallelism| {
            trainer.train(features.view(), &targets, parallelism)
        });

        let baseline = TreeExplainer::new(&forest)
            .expect("fitted trees carry covers")
            .base_value();

        Ok(Self {
            forest,
            config,
            baseline,
            n_training_examples: training.len(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Expected prediction over the training set (attribution zero point).
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn n_training_examples(&self) -> usize {
        self.n_training_examples
    }

    // =========================================================================
    // Inference
    // =========================================================================

    /// Class-1 probability for one record, in [0, 1].
    ///
    /// Out-of-distribution inputs are not an error; the forest returns its
    /// best-effort probability.
    pub fn predict(&self, x: &FeatureVector) -> f64 {
        self.forest.predict_row(&x.to_array())
    }

    /// Per-feature SHAP contributions for one record.
    ///
    /// Satisfies `baseline() + result.sum() == predict(x)` within 1e-6.
    pub fn explain(&self, x: &FeatureVector) -> Result<Attributions, ExplainError> {
        let explainer = TreeExplainer::with_base_value(&self.forest, self.baseline)?;
        let phi = explainer.shap_values(&x.to_array());
        let mut values = [0.0f64; N_FEATURES];
        values.copy_from_slice(&phi);
        Ok(Attributions::from_values(values))
    }

    /// Score a feature-major matrix `[n_features, n_samples]`; used by
    /// evaluation tooling.
    pub fn predict_matrix(&self, features: ArrayView2<'_, f32>) -> Vec<f64> {
        debug_assert_eq!(features.nrows(), N_FEATURES);
        let mut sample = [0.0f32; N_FEATURES];
        (0..features.ncols())
            .map(|col| {
                for (feature, value) in sample.iter_mut().enumerate() {
                    *value = features[[feature, col]];
                }
                self.forest.predict_row(&sample)
            })
            .collect()
    }
}

impl std::fmt::Debug for RiskModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.forest.n_features())
            .field("baseline", &self.baseline)
            .field("n_training_examples", &self.n_training_examples)
            .finish()
    }
}
