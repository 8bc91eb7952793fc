//! End-to-end service tests.
//!
//! Focused on behavior and invariants: readiness transitions, error
//! mapping, the wire shape of responses, and the reference scenario from
//! the embedded training sample.

use riskforest::{
    ForestConfig, InferenceService, RiskLevel, ServiceError, TrainingSet, ValidationError,
    FIELD_NAMES,
};
use serde_json::{json, Map, Value};

fn raw_request(overrides: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = match json!({
        "pregnancies": 6,
        "glucose": 148,
        "bloodPressure": 72,
        "skinThickness": 35,
        "insulin": 0,
        "bmi": 33.6,
        "diabetesPedigree": 0.627,
        "age": 50,
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    for (key, value) in overrides {
        map.insert((*key).to_string(), value.clone());
    }
    map
}

fn ready_service() -> InferenceService {
    let config = ForestConfig::builder()
        .n_trees(100)
        .max_depth(6)
        .build()
        .unwrap();
    let service = InferenceService::new(TrainingSet::reference_sample(), config);
    service.fit().expect("reference sample fits");
    service
}

#[test]
fn infer_before_fit_is_unavailable() {
    let service = InferenceService::new(TrainingSet::reference_sample(), ForestConfig::default());
    assert_eq!(
        service.infer(&raw_request(&[])),
        Err(ServiceError::Unavailable)
    );
}

#[test]
fn reference_row_scores_high_with_glucose_among_top_drivers() {
    // The request is an exact training row with outcome 1: the fitted
    // ensemble should be confident, with glucose among the strongest
    // drivers of that confidence.
    let service = ready_service();
    let response = service.infer(&raw_request(&[])).unwrap();

    assert!(
        response.probability > 0.6,
        "expected a confident positive, got {}",
        response.probability
    );
    assert!(matches!(
        response.risk_level(),
        RiskLevel::Medium | RiskLevel::High
    ));

    let top3: Vec<&str> = response
        .shap_values
        .top_by_magnitude(3)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(top3.contains(&"glucose"), "top-3 was {top3:?}");
    // bmi = 33.6 sits in an all-positive band of the sample; its exact rank
    // among the strong drivers varies with the bootstrap, its sign does not
    assert!(
        response.shap_values.bmi > 0.0,
        "bmi contribution was {}",
        response.shap_values.bmi
    );
}

#[test]
fn probability_is_bounded_for_extreme_inputs() {
    let service = ready_service();
    let extreme = raw_request(&[
        ("glucose", json!(100000)),
        ("bmi", json!(900.5)),
        ("age", json!(4000)),
    ]);
    let response = service.infer(&extreme).unwrap();
    assert!((0.0..=1.0).contains(&response.probability));
}

#[test]
fn attributions_are_additive_against_the_baseline() {
    let service = ready_service();
    let model = service.model().unwrap();

    for raw in [
        raw_request(&[]),
        raw_request(&[("glucose", json!(85)), ("age", json!(21))]),
        raw_request(&[("insulin", json!(846)), ("bmi", json!(0))]),
    ] {
        let response = service.infer(&raw).unwrap();
        let reconstructed = model.baseline() + response.shap_values.sum();
        assert!(
            (reconstructed - response.probability).abs() < 1e-6,
            "baseline {} + contributions {} != probability {}",
            model.baseline(),
            response.shap_values.sum(),
            response.probability
        );
    }
}

#[test]
fn response_serializes_with_the_documented_shape() {
    let service = ready_service();
    let response = service.infer(&raw_request(&[])).unwrap();

    let body = serde_json::to_value(&response).unwrap();
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object["probability"].is_number());

    let shap = object["shap_values"].as_object().unwrap();
    assert_eq!(shap.len(), FIELD_NAMES.len());
    for name in FIELD_NAMES {
        assert!(shap.contains_key(name), "missing attribution key {name}");
    }
}

#[test]
fn inference_is_bit_identical_across_calls() {
    let service = ready_service();
    let raw = raw_request(&[]);

    let first = serde_json::to_string(&service.infer(&raw).unwrap()).unwrap();
    let second = serde_json::to_string(&service.infer(&raw).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn bad_requests_name_the_offending_field() {
    let service = ready_service();

    let mut missing = raw_request(&[]);
    missing.remove("age");
    assert_eq!(
        service.infer(&missing),
        Err(ServiceError::BadRequest(ValidationError::MissingField {
            field: "age"
        }))
    );

    let negative = raw_request(&[("glucose", json!(-5))]);
    assert_eq!(
        service.infer(&negative),
        Err(ServiceError::BadRequest(ValidationError::NegativeValue {
            field: "glucose",
            value: -5.0
        }))
    );

    let garbled = raw_request(&[("skinThickness", json!([1, 2]))]);
    assert_eq!(
        service.infer(&garbled),
        Err(ServiceError::BadRequest(ValidationError::NotNumeric {
            field: "skinThickness"
        }))
    );
}

#[test]
fn zero_sentinels_are_accepted() {
    let service = ready_service();
    let zeros = raw_request(&[
        ("insulin", json!(0)),
        ("skinThickness", json!(0)),
        ("bloodPressure", json!(0)),
    ]);
    assert!(service.infer(&zeros).is_ok());
}

#[test]
fn error_bodies_are_transport_ready() {
    let service = InferenceService::new(TrainingSet::reference_sample(), ForestConfig::default());
    let err = service.infer(&raw_request(&[])).unwrap_err();
    let body = err.to_error_body();
    assert!(body["error"].is_string());
}

#[test]
fn concurrent_inference_agrees_with_sequential() {
    use std::thread;

    let service = std::sync::Arc::new(ready_service());
    let raw = raw_request(&[]);
    let expected = service.infer(&raw).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = std::sync::Arc::clone(&service);
            let raw = raw.clone();
            thread::spawn(move || service.infer(&raw).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
