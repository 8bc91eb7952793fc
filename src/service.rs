//! The inference service: validate → score → explain.
//!
//! [`InferenceService`] owns the training snapshot, the training
//! configuration, and the readiness state machine:
//!
//! ```text
//! Uninitialized --fit ok--> Ready --refit ok--> Ready
//!       |                     |
//!       +----fit fails--------+--refit fails--> Unavailable
//! ```
//!
//! A new model is published (behind an `Arc`) only after training returns
//! successfully, so no request ever observes a partially-built model. A
//! failed fit never falls back to a previous model: the service reports
//! `Unavailable` until an administrative refit succeeds.
//!
//! [`infer`](InferenceService::infer) snapshots the current `Arc` and
//! releases the state lock before any computation, so concurrent requests
//! against a Ready model run fully in parallel.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::TrainingSet;
use crate::explain::Attributions;
use crate::features::{FeatureVector, ValidationError};
use crate::model::{FitError, RiskModel};
use crate::training::ForestConfig;

// =============================================================================
// ServiceError
// =============================================================================

/// Request-visible failure taxonomy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Malformed, missing, or negative input. The client must correct and
    /// resubmit; retrying unchanged input cannot succeed.
    #[error("bad request: {0}")]
    BadRequest(#[from] ValidationError),
    /// Model not yet trained, or the last training attempt failed. Retry
    /// later, possibly after an administrative refit.
    #[error("model not ready")]
    Unavailable,
    /// Unexpected failure inside model or attribution computation. Opaque:
    /// details are logged, never returned.
    #[error("internal error")]
    Internal(String),
}

impl ServiceError {
    /// The `{"error": ...}` body transport layers return on failure.
    pub fn to_error_body(&self) -> Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

// =============================================================================
// PredictionResponse / RiskLevel
// =============================================================================

/// Successful inference result, created fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    /// Class-1 probability in [0, 1].
    pub probability: f64,
    /// Per-feature SHAP contributions; keys are exactly the eight feature
    /// names.
    pub shap_values: Attributions,
}

impl PredictionResponse {
    /// Coarse risk band for the probability.
    ///
    /// Derived, not serialized: the wire shape stays
    /// `{probability, shap_values}`.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }
}

/// Coarse risk banding at the cut-points the report UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// probability ≤ 0.40
    Low,
    /// 0.40 < probability ≤ 0.70
    Medium,
    /// probability > 0.70
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.70 {
            RiskLevel::High
        } else if probability > 0.40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

// =============================================================================
// InferenceService
// =============================================================================

/// Readiness of the service's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// No fit attempted yet.
    Uninitialized,
    /// A fitted model is being served.
    Ready,
    /// The last fit attempt failed; no model is served.
    Unavailable,
}

enum ModelState {
    Uninitialized,
    Ready(Arc<RiskModel>),
    Unavailable { cause: FitError },
}

/// Validate → score → explain orchestration over one training snapshot.
pub struct InferenceService {
    training: TrainingSet,
    config: ForestConfig,
    state: RwLock<ModelState>,
}

impl InferenceService {
    /// Create an uninitialized service. Call [`fit`](Self::fit) before
    /// serving.
    pub fn new(training: TrainingSet, config: ForestConfig) -> Self {
        Self {
            training,
            config,
            state: RwLock::new(ModelState::Uninitialized),
        }
    }

    /// Train the model from the service's training set and publish it.
    ///
    /// On failure the service becomes (or stays) `Unavailable`; any
    /// previously served model is dropped rather than silently reused.
    pub fn fit(&self) -> Result<(), ServiceError> {
        log::info!(
            "fitting risk model: {} examples, {} trees, seed {}",
            self.training.len(),
            self.config.n_trees,
            self.config.seed
        );

        let outcome = RiskModel::fit(&self.training, self.config.clone());
        let mut state = self
            .state
            .write()
            .map_err(|_| ServiceError::Internal("state lock poisoned".into()))?;

        match outcome {
            Ok(model) => {
                log::info!("risk model ready: baseline {:.4}", model.baseline());
                *state = ModelState::Ready(Arc::new(model));
                Ok(())
            }
            Err(cause) => {
                log::error!("risk model fit failed: {cause}");
                *state = ModelState::Unavailable { cause };
                Err(ServiceError::Unavailable)
            }
        }
    }

    /// Administrative re-train from the current training set.
    ///
    /// Rare operation (deployment/update time), not a per-request path.
    pub fn refit(&self) -> Result<(), ServiceError> {
        log::info!("refit requested");
        self.fit()
    }

    /// Current readiness.
    pub fn readiness(&self) -> Readiness {
        match self.state.read() {
            Ok(state) => match &*state {
                ModelState::Uninitialized => Readiness::Uninitialized,
                ModelState::Ready(_) => Readiness::Ready,
                ModelState::Unavailable { .. } => Readiness::Unavailable,
            },
            Err(_) => Readiness::Unavailable,
        }
    }

    /// Why the last fit failed, if it did.
    pub fn fit_error(&self) -> Option<FitError> {
        match self.state.read() {
            Ok(state) => match &*state {
                ModelState::Unavailable { cause } => Some(cause.clone()),
                _ => None,
            },
            Err(_) => None,
        }
    }

    /// Snapshot of the currently served model, if any.
    pub fn model(&self) -> Option<Arc<RiskModel>> {
        match self.state.read() {
            Ok(state) => match &*state {
                ModelState::Ready(model) => Some(Arc::clone(model)),
                _ => None,
            },
            Err(_) => None,
        }
    }

    /// Run one inference request.
    ///
    /// Validation runs first (fail fast, before any model work), then the
    /// model snapshot is taken and scoring/attribution proceed without
    /// holding any lock. Deterministic: identical input against the same
    /// fitted model yields a bit-identical response.
    pub fn infer(&self, raw: &Map<String, Value>) -> Result<PredictionResponse, ServiceError> {
        let features = FeatureVector::from_raw(raw).map_err(|err| {
            log::debug!("rejected request: {err}");
            ServiceError::BadRequest(err)
        })?;

        let model = self.model().ok_or(ServiceError::Unavailable)?;

        let probability = model.predict(&features);
        debug_assert!((0.0..=1.0).contains(&probability));

        let shap_values = model.explain(&features).map_err(|err| {
            log::error!("attribution failed: {err}");
            ServiceError::Internal(err.to_string())
        })?;

        Ok(PredictionResponse {
            probability,
            shap_values,
        })
    }
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("n_training_examples", &self.training.len())
            .field("readiness", &self.readiness())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Outcome;
    use serde_json::json;

    fn test_config() -> ForestConfig {
        ForestConfig::builder()
            .n_trees(20)
            .max_depth(4)
            .build()
            .unwrap()
    }

    fn service() -> InferenceService {
        InferenceService::new(TrainingSet::reference_sample(), test_config())
    }

    fn raw_request() -> Map<String, Value> {
        match json!({
            "pregnancies": 6, "glucose": 148, "bloodPressure": 72,
            "skinThickness": 35, "insulin": 0, "bmi": 33.6,
            "diabetesPedigree": 0.627, "age": 50,
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn starts_uninitialized_and_unavailable() {
        let service = service();
        assert_eq!(service.readiness(), Readiness::Uninitialized);
        assert!(service.model().is_none());
        assert_eq!(service.infer(&raw_request()), Err(ServiceError::Unavailable));
    }

    #[test]
    fn fit_transitions_to_ready() {
        let service = service();
        service.fit().unwrap();
        assert_eq!(service.readiness(), Readiness::Ready);
        assert!(service.fit_error().is_none());
        assert!(service.infer(&raw_request()).is_ok());
    }

    #[test]
    fn failed_fit_is_unavailable_with_cause() {
        let positives: Vec<_> = TrainingSet::reference_sample()
            .iter()
            .filter(|e| e.outcome == Outcome::Positive)
            .copied()
            .collect();
        let service = InferenceService::new(TrainingSet::new(positives), test_config());

        assert_eq!(service.fit(), Err(ServiceError::Unavailable));
        assert_eq!(service.readiness(), Readiness::Unavailable);
        assert!(matches!(
            service.fit_error(),
            Some(FitError::InsufficientData { negatives: 0, .. })
        ));
        assert_eq!(service.infer(&raw_request()), Err(ServiceError::Unavailable));

        // refit over the same single-class snapshot fails the same way
        assert_eq!(service.refit(), Err(ServiceError::Unavailable));
        assert_eq!(service.readiness(), Readiness::Unavailable);
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let service = service();
        service.fit().unwrap();

        let mut raw = raw_request();
        raw.remove("age");
        match service.infer(&raw) {
            Err(ServiceError::BadRequest(ValidationError::MissingField { field })) => {
                assert_eq!(field, "age")
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }

        let mut raw = raw_request();
        raw.insert("glucose".into(), json!(-5));
        assert!(matches!(
            service.infer(&raw),
            Err(ServiceError::BadRequest(ValidationError::NegativeValue {
                field: "glucose",
                ..
            }))
        ));
    }

    #[test]
    fn validation_runs_before_readiness() {
        // fail fast at the boundary even when no model is fitted
        let service = service();
        let mut raw = raw_request();
        raw.insert("bmi".into(), json!("not-a-number"));
        assert!(matches!(
            service.infer(&raw),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn refit_keeps_serving() {
        let service = service();
        service.fit().unwrap();
        let before = service.infer(&raw_request()).unwrap();
        service.refit().unwrap();
        assert_eq!(service.readiness(), Readiness::Ready);
        // same data, same seed: the refitted model answers identically
        assert_eq!(service.infer(&raw_request()).unwrap(), before);
    }

    #[test]
    fn risk_level_cut_points() {
        assert_eq!(RiskLevel::from_probability(0.10), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.70), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
    }

    #[test]
    fn error_body_shape() {
        let body = ServiceError::Unavailable.to_error_body();
        assert_eq!(body, json!({ "error": "model not ready" }));
    }
}
