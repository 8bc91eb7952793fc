//! riskforest: diabetes risk inference and explanation.
//!
//! A bagged decision-tree classifier over eight clinical measurements,
//! paired with exact TreeSHAP attributions that explain each prediction
//! against a cached training-set baseline.
//!
//! # Key Types
//!
//! - [`InferenceService`] - Validate → score → explain orchestration with a
//!   construct → fit → serve → refit lifecycle
//! - [`RiskModel`] / [`ForestConfig`] - The trained ensemble and its
//!   training configuration
//! - [`FeatureVector`] - The typed clinical record accepted at the boundary
//! - [`Attributions`] - Per-feature SHAP contributions
//! - [`TrainingSet`] - Labeled examples the model is fitted from
//!
//! # Serving
//!
//! Build an [`InferenceService`] from a [`TrainingSet`] and a
//! [`ForestConfig`], call [`fit`](InferenceService::fit) once at startup,
//! then call [`infer`](InferenceService::infer) from any number of request
//! workers. See the [`service`] module for details.
//!
//! # Training
//!
//! Use `ForestConfig::builder()` to configure, then [`RiskModel::fit`].
//! Fitting is deterministic for a fixed seed. See the [`training`] module.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod explain;
pub mod features;
pub mod model;
pub mod repr;
pub mod service;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Boundary types
pub use features::{FeatureVector, ValidationError, FIELD_NAMES};

// Training data
pub use data::{DataError, Outcome, TrainingExample, TrainingSet};

// Model and configuration
pub use model::{FitError, RiskModel};
pub use training::{ConfigError, FeatureSampling, ForestConfig};

// Explanations
pub use explain::{Attributions, ExplainError, TreeExplainer};

// Serving
pub use service::{InferenceService, PredictionResponse, Readiness, RiskLevel, ServiceError};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
