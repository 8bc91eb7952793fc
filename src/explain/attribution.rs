//! Per-feature attribution results.

use serde::{Deserialize, Serialize};

use crate::features::{FIELD_NAMES, N_FEATURES};

/// Signed SHAP contribution of each feature to one prediction.
///
/// A mapping, not a sequence: every field is one of the eight canonical
/// feature names and serialization carries exactly those keys. Positive
/// values pushed the probability above the baseline, negative values below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributions {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
}

impl Attributions {
    /// Build from values in [`FIELD_NAMES`] order.
    pub fn from_values(values: [f64; N_FEATURES]) -> Self {
        Self {
            pregnancies: values[0],
            glucose: values[1],
            blood_pressure: values[2],
            skin_thickness: values[3],
            insulin: values[4],
            bmi: values[5],
            diabetes_pedigree: values[6],
            age: values[7],
        }
    }

    /// Values in [`FIELD_NAMES`] order.
    pub fn to_values(&self) -> [f64; N_FEATURES] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree,
            self.age,
        ]
    }

    /// `(wire name, value)` pairs in canonical order.
    pub fn to_pairs(&self) -> [(&'static str, f64); N_FEATURES] {
        let values = self.to_values();
        let mut pairs = [("", 0.0); N_FEATURES];
        for (pair, (&name, value)) in pairs
            .iter_mut()
            .zip(FIELD_NAMES.iter().zip(values.into_iter()))
        {
            *pair = (name, value);
        }
        pairs
    }

    /// Sum of all contributions.
    pub fn sum(&self) -> f64 {
        self.to_values().iter().sum()
    }

    /// The `k` largest contributions by absolute value, descending.
    ///
    /// Ties keep canonical field order, so the result is deterministic.
    pub fn top_by_magnitude(&self, k: usize) -> Vec<(&'static str, f64)> {
        let mut pairs = self.to_pairs().to_vec();
        pairs.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs.truncate(k);
        pairs
    }
}
