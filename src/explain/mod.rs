//! SHAP (SHapley Additive exPlanations) attribution for the fitted forest.
//!
//! [`TreeExplainer`] computes exact per-feature contributions in polynomial
//! time using the TreeSHAP algorithm from Lundberg et al. (2020): "From
//! local explanations to global understanding with explainable AI for
//! trees". Contributions are additive: for every sample,
//!
//! ```text
//! base_value + sum(attributions) == forest prediction
//! ```
//!
//! within floating-point tolerance (all accumulation is `f64`). The base
//! value is the cover-weighted expected prediction over the training set,
//! computed once per fitted forest and cached.

mod attribution;
mod path;
mod tree_explainer;

pub use attribution::Attributions;
pub use tree_explainer::TreeExplainer;

/// Attribution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    /// A tree is missing the cover statistics TreeSHAP weights paths by.
    #[error("cover statistics required for SHAP attribution")]
    MissingNodeStats,
}
