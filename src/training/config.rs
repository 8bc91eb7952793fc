//! High-level training configuration with builder pattern.
//!
//! [`ForestConfig`] composes the ensemble hyperparameters and uses the
//! `bon` crate for builder generation with validation at build time.
//!
//! # Example
//!
//! ```
//! use riskforest::training::{FeatureSampling, ForestConfig};
//!
//! // All defaults: 100 trees, depth 8, sqrt feature sampling, seed 42
//! let config = ForestConfig::builder().build().unwrap();
//!
//! // Customize
//! let config = ForestConfig::builder()
//!     .n_trees(200)
//!     .max_depth(6)
//!     .feature_sampling(FeatureSampling::All)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use super::Verbosity;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    #[error("n_trees must be at least 1")]
    InvalidNTrees,
    /// Maximum depth must be at least 1.
    #[error("max_depth must be at least 1")]
    InvalidMaxDepth,
    /// A split needs at least two samples to divide.
    #[error("min_samples_split must be at least 2, got {0}")]
    InvalidMinSamplesSplit(usize),
    /// Every leaf must hold at least one sample.
    #[error("min_samples_leaf must be at least 1")]
    InvalidMinSamplesLeaf,
    /// Feature sampling fraction outside (0, 1].
    #[error("feature sampling fraction must be in (0, 1], got {0}")]
    InvalidSamplingFraction(f32),
    /// Minimum split gain must be non-negative.
    #[error("min_gain must be non-negative, got {0}")]
    InvalidMinGain(f64),
}

// =============================================================================
// FeatureSampling
// =============================================================================

/// How many features to consider at each split.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FeatureSampling {
    /// Consider every feature at every split (no randomization).
    All,
    /// Consider `floor(sqrt(n_features))` features, min 1. The usual
    /// classification default.
    #[default]
    Sqrt,
    /// Consider `ceil(fraction * n_features)` features, min 1.
    Fraction(f32),
}

impl FeatureSampling {
    /// Size of the per-split candidate subset for `n_features` inputs.
    pub fn subset_size(&self, n_features: usize) -> usize {
        let size = match self {
            FeatureSampling::All => n_features,
            FeatureSampling::Sqrt => (n_features as f64).sqrt().floor() as usize,
            FeatureSampling::Fraction(fraction) => {
                (*fraction as f64 * n_features as f64).ceil() as usize
            }
        };
        size.clamp(1, n_features)
    }
}

// =============================================================================
// ForestConfig
// =============================================================================

/// Configuration for fitting the bagged forest.
///
/// Defaults mirror the reference ensemble: 100 trees, sqrt feature
/// sampling, seed 42. Depth is bounded (default 8) so training time and
/// explanation cost stay predictable.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    /// Number of trees in the ensemble. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Maximum tree depth in split levels. Default: 8.
    #[builder(default = 8)]
    pub max_depth: u32,

    /// Minimum samples a node needs to be considered for splitting.
    /// Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: usize,

    /// Minimum samples each child of a split must keep. Default: 1.
    #[builder(default = 1)]
    pub min_samples_leaf: usize,

    /// Minimum Gini impurity decrease for a split to be kept. Default: 0
    /// (any strict improvement splits).
    #[builder(default = 0.0)]
    pub min_gain: f64,

    /// Per-split feature subsampling. Default: [`FeatureSampling::Sqrt`].
    #[builder(default)]
    pub feature_sampling: FeatureSampling,

    /// Random seed. Default: 42.
    ///
    /// Fitting is fully deterministic for a fixed seed and training set:
    /// per-tree RNG streams are derived from this value, independent of
    /// thread count.
    #[builder(default = 42)]
    pub seed: u64,

    /// Thread count for fitting: 0 = auto, 1 = sequential, >1 = exact.
    /// Default: 1.
    #[builder(default = 1)]
    pub n_threads: usize,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `n_trees == 0` or `max_depth == 0`
    /// - `min_samples_split < 2` or `min_samples_leaf == 0`
    /// - sampling fraction outside (0, 1]
    /// - negative `min_gain`
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        if self.min_samples_leaf == 0 {
            return Err(ConfigError::InvalidMinSamplesLeaf);
        }
        if let FeatureSampling::Fraction(fraction) = self.feature_sampling {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigError::InvalidSamplingFraction(fraction));
            }
        }
        if self.min_gain < 0.0 {
            return Err(ConfigError::InvalidMinGain(self.min_gain));
        }
        Ok(())
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}
