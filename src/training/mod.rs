//! Training infrastructure for the bagged forest.
//!
//! - [`ForestConfig`]: validated training configuration (builder)
//! - [`ForestTrainer`]: grows the ensemble from a feature matrix
//! - [`BootstrapSampler`] / [`FeatureSampler`]: seeded row and feature
//!   sampling
//! - [`TrainingLogger`], [`Verbosity`]: fit progress through the `log`
//!   facade
//!
//! Training is deterministic for a fixed [`ForestConfig::seed`]: every
//! tree draws from its own seed-derived RNG stream, so results do not
//! depend on thread count or scheduling.

mod config;
mod grower;
mod logger;
mod sampling;
mod trainer;

pub use config::{ConfigError, FeatureSampling, ForestConfig};
pub use logger::{TrainingLogger, Verbosity};
pub use sampling::{tree_seed, BootstrapSampler, FeatureSampler};
pub use trainer::ForestTrainer;
