//! Training data for the risk model.
//!
//! [`TrainingSet`] is an ordered, immutable sequence of labeled examples,
//! supplied by the deployment at service startup. Three sources are
//! supported:
//!
//! - [`TrainingSet::reference_sample`] - the twenty-row sample embedded in
//!   the original service, kept as a versioned fixture for tests and demos
//! - [`TrainingSet::from_csv_reader`] - a CSV snapshot with the historical
//!   column headers (`Pregnancies,...,Outcome`)
//! - plain serde JSON on `Vec<TrainingExample>`
//!
//! # Storage Layout
//!
//! [`TrainingSet::feature_matrix`] exports features in **feature-major**
//! layout: `[n_features, n_samples]`. Each feature's values across all
//! samples are contiguous, which is what split scanning during training
//! wants.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, N_FEATURES};

// =============================================================================
// DataError
// =============================================================================

/// Errors loading a training snapshot.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Malformed CSV input.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    /// An outcome column value other than 0 or 1.
    #[error("outcome label must be 0 or 1, got {0}")]
    InvalidOutcome(u8),
}

// =============================================================================
// Outcome
// =============================================================================

/// Binary diabetes outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Outcome {
    Negative,
    Positive,
}

impl Outcome {
    /// Label as the 0.0 / 1.0 target the trainer consumes.
    #[inline]
    pub fn as_f32(self) -> f32 {
        match self {
            Outcome::Negative => 0.0,
            Outcome::Positive => 1.0,
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = DataError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::Negative),
            1 => Ok(Outcome::Positive),
            other => Err(DataError::InvalidOutcome(other)),
        }
    }
}

impl From<Outcome> for u8 {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Negative => 0,
            Outcome::Positive => 1,
        }
    }
}

// =============================================================================
// TrainingExample / TrainingSet
// =============================================================================

/// One labeled clinical record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    #[serde(flatten)]
    pub features: FeatureVector,
    pub outcome: Outcome,
}

/// Ordered sequence of training examples.
///
/// Immutable at request time: the service holds one snapshot and the model
/// is fitted from it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
}

impl TrainingSet {
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingExample> {
        self.examples.iter()
    }

    /// Count of (negative, positive) outcomes.
    pub fn class_counts(&self) -> (usize, usize) {
        let positive = self
            .examples
            .iter()
            .filter(|e| e.outcome == Outcome::Positive)
            .count();
        (self.examples.len() - positive, positive)
    }

    /// Whether both outcome classes are present.
    ///
    /// A single-class set cannot produce a probability estimate; `fit`
    /// rejects it.
    pub fn has_both_classes(&self) -> bool {
        let (negative, positive) = self.class_counts();
        negative > 0 && positive > 0
    }

    /// Export features in feature-major layout: `[n_features, n_samples]`.
    pub fn feature_matrix(&self) -> Array2<f32> {
        let n_samples = self.examples.len();
        let mut matrix = Array2::zeros((N_FEATURES, n_samples));
        for (sample, example) in self.examples.iter().enumerate() {
            for (feature, value) in example.features.to_array().into_iter().enumerate() {
                matrix[[feature, sample]] = value;
            }
        }
        matrix
    }

    /// Outcome labels as 0.0 / 1.0 targets, in example order.
    pub fn targets(&self) -> Vec<f32> {
        self.examples.iter().map(|e| e.outcome.as_f32()).collect()
    }

    /// Load from CSV with the historical column headers
    /// (`Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,
    /// DiabetesPedigreeFunction,Age,Outcome`).
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, DataError> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(rename = "Pregnancies")]
            pregnancies: f32,
            #[serde(rename = "Glucose")]
            glucose: f32,
            #[serde(rename = "BloodPressure")]
            blood_pressure: f32,
            #[serde(rename = "SkinThickness")]
            skin_thickness: f32,
            #[serde(rename = "Insulin")]
            insulin: f32,
            #[serde(rename = "BMI")]
            bmi: f32,
            #[serde(rename = "DiabetesPedigreeFunction")]
            diabetes_pedigree: f32,
            #[serde(rename = "Age")]
            age: f32,
            #[serde(rename = "Outcome")]
            outcome: u8,
        }

        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut examples = Vec::new();
        for row in csv_reader.deserialize::<Row>() {
            let row = row?;
            examples.push(TrainingExample {
                features: FeatureVector {
                    pregnancies: row.pregnancies,
                    glucose: row.glucose,
                    blood_pressure: row.blood_pressure,
                    skin_thickness: row.skin_thickness,
                    insulin: row.insulin,
                    bmi: row.bmi,
                    diabetes_pedigree: row.diabetes_pedigree,
                    age: row.age,
                },
                outcome: Outcome::try_from(row.outcome)?,
            });
        }
        Ok(Self::new(examples))
    }

    /// The twenty-row sample embedded in the original service.
    ///
    /// A fixture, not a real training corpus: deployments provide their own
    /// snapshot via [`from_csv_reader`](Self::from_csv_reader) or JSON.
    pub fn reference_sample() -> Self {
        const ROWS: [([f32; N_FEATURES], u8); 20] = [
            ([6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0], 1),
            ([1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0], 0),
            ([8.0, 183.0, 64.0, 0.0, 0.0, 23.3, 0.672, 32.0], 1),
            ([1.0, 89.0, 66.0, 23.0, 94.0, 28.1, 0.167, 21.0], 0),
            ([0.0, 137.0, 40.0, 35.0, 168.0, 43.1, 2.288, 33.0], 1),
            ([5.0, 116.0, 74.0, 0.0, 0.0, 25.6, 0.201, 30.0], 0),
            ([3.0, 78.0, 50.0, 32.0, 88.0, 31.0, 0.248, 26.0], 1),
            ([10.0, 115.0, 0.0, 0.0, 0.0, 35.3, 0.134, 29.0], 0),
            ([2.0, 197.0, 70.0, 45.0, 543.0, 30.5, 0.158, 53.0], 1),
            ([8.0, 125.0, 96.0, 0.0, 0.0, 0.0, 0.232, 54.0], 1),
            ([4.0, 110.0, 92.0, 0.0, 0.0, 37.6, 0.191, 30.0], 0),
            ([10.0, 168.0, 74.0, 0.0, 0.0, 38.0, 0.537, 34.0], 1),
            ([10.0, 139.0, 80.0, 0.0, 0.0, 27.1, 1.441, 57.0], 0),
            ([1.0, 189.0, 60.0, 23.0, 846.0, 30.1, 0.398, 59.0], 1),
            ([5.0, 166.0, 72.0, 19.0, 175.0, 25.8, 0.587, 51.0], 1),
            ([7.0, 100.0, 0.0, 0.0, 0.0, 30.0, 0.484, 32.0], 1),
            ([0.0, 118.0, 84.0, 47.0, 230.0, 45.8, 0.551, 31.0], 1),
            ([7.0, 107.0, 74.0, 0.0, 0.0, 29.6, 0.254, 31.0], 1),
            ([1.0, 103.0, 30.0, 38.0, 83.0, 43.3, 0.183, 33.0], 0),
            ([1.0, 115.0, 70.0, 30.0, 96.0, 34.6, 0.529, 32.0], 1),
        ];

        let examples = ROWS
            .iter()
            .map(|&(values, label)| TrainingExample {
                features: FeatureVector::from_array(values),
                outcome: if label == 1 {
                    Outcome::Positive
                } else {
                    Outcome::Negative
                },
            })
            .collect();
        Self::new(examples)
    }
}
