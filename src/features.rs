//! The typed clinical record and its boundary validation.
//!
//! [`FeatureVector`] is the canonical input to the model: eight named
//! numeric measurements. Transport layers hand the core an untyped JSON
//! mapping; [`FeatureVector::from_raw`] converts it, reporting the first
//! violation it finds. Validation is deliberately permissive upward - the
//! model must cope with clinical extremes, so no upper bounds are enforced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical wire names of the eight features, in field order.
///
/// This order is the order validation reports errors in, and the order
/// [`FeatureVector::to_array`] and attribution values use.
pub const FIELD_NAMES: [&str; 8] = [
    "pregnancies",
    "glucose",
    "bloodPressure",
    "skinThickness",
    "insulin",
    "bmi",
    "diabetesPedigree",
    "age",
];

/// Number of input features.
pub const N_FEATURES: usize = FIELD_NAMES.len();

// =============================================================================
// ValidationError
// =============================================================================

/// Boundary validation failures.
///
/// Messages are field-specific; the presentation layer shows them verbatim
/// for bad requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required key is absent from the raw mapping.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    /// A value is neither a JSON number nor a string holding a finite real.
    #[error("field `{field}` is not a numeric value")]
    NotNumeric { field: &'static str },
    /// A value parsed as a real number but is negative.
    #[error("field `{field}` must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },
}

// =============================================================================
// FeatureVector
// =============================================================================

/// One individual's eight clinical measurements.
///
/// All fields are non-negative. Zero is a legal value for `glucose`,
/// `blood_pressure`, `skin_thickness`, `insulin` and `bmi`: the historical
/// source data uses 0 to mean "not measured", so zeros are accepted as-is
/// rather than rejected. No upper bounds are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Number of pregnancies.
    pub pregnancies: f32,
    /// Plasma glucose concentration, mg/dL.
    pub glucose: f32,
    /// Diastolic blood pressure, mm Hg.
    pub blood_pressure: f32,
    /// Triceps skin fold thickness, mm.
    pub skin_thickness: f32,
    /// 2-hour serum insulin, µU/mL.
    pub insulin: f32,
    /// Body mass index, kg/m².
    pub bmi: f32,
    /// Diabetes pedigree function (family-history score, unbounded above).
    pub diabetes_pedigree: f32,
    /// Age in years.
    pub age: f32,
}

impl FeatureVector {
    /// Validate and convert an untyped JSON mapping into a typed record.
    ///
    /// Keys are checked in [`FIELD_NAMES`] order and the first violation is
    /// returned, so error reporting is deterministic. Values may be JSON
    /// numbers or strings holding a finite real number. Unknown extra keys
    /// are ignored (transport layers attach their own metadata).
    ///
    /// Pure function: no side effects.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut values = [0.0f32; N_FEATURES];
        for (slot, &field) in values.iter_mut().zip(FIELD_NAMES.iter()) {
            let value = raw
                .get(field)
                .ok_or(ValidationError::MissingField { field })?;
            let number = parse_numeric(value).ok_or(ValidationError::NotNumeric { field })?;
            if number < 0.0 {
                return Err(ValidationError::NegativeValue {
                    field,
                    value: number,
                });
            }
            *slot = number as f32;
        }
        Ok(Self::from_array(values))
    }

    /// Feature values in [`FIELD_NAMES`] order.
    #[inline]
    pub fn to_array(&self) -> [f32; N_FEATURES] {
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

    /// Build a record from values in [`FIELD_NAMES`] order.
    #[inline]
    pub fn from_array(values: [f32; N_FEATURES]) -> Self {
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
}

/// Extract a finite real number from a JSON value.
///
/// JSON numbers are accepted directly; strings are accepted when they parse
/// to a finite real (the historical form posts numbers, but proxies have
/// been seen stringifying them). NaN and infinities are not measurements.
fn parse_numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
