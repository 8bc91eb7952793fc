//! Attribution integration tests: additivity, baseline semantics, shape.

use riskforest::approx::assert_relative_eq;
use riskforest::{
    Attributions, FeatureVector, ForestConfig, RiskModel, TrainingSet, TreeExplainer, FIELD_NAMES,
};

fn fitted_model(n_trees: u32) -> (TrainingSet, RiskModel) {
    let training = TrainingSet::reference_sample();
    let config = ForestConfig::builder()
        .n_trees(n_trees)
        .max_depth(6)
        .build()
        .unwrap();
    let model = RiskModel::fit(&training, config).unwrap();
    (training, model)
}

#[test]
fn additivity_holds_for_every_training_row() {
    let (training, model) = fitted_model(80);

    for example in training.iter() {
        let probability = model.predict(&example.features);
        let attributions = model.explain(&example.features).unwrap();
        assert_relative_eq!(
            model.baseline() + attributions.sum(),
            probability,
            epsilon = 1e-6
        );
    }
}

#[test]
fn additivity_holds_out_of_distribution() {
    let (_, model) = fitted_model(50);

    let rows = [
        [0.0f32, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [20.0, 500.0, 200.0, 99.0, 2000.0, 80.0, 5.0, 120.0],
        [3.0, 120.0, 70.0, 20.0, 79.0, 32.0, 0.47, 29.0],
    ];
    for row in rows {
        let x = FeatureVector::from_array(row);
        let attributions = model.explain(&x).unwrap();
        assert_relative_eq!(
            model.baseline() + attributions.sum(),
            model.predict(&x),
            epsilon = 1e-6
        );
    }
}

#[test]
fn baseline_is_the_mean_training_prediction() {
    let (training, model) = fitted_model(60);

    let mean: f64 = training
        .iter()
        .map(|e| model.predict(&e.features))
        .sum::<f64>()
        / training.len() as f64;
    assert_relative_eq!(model.baseline(), mean, epsilon = 1e-9);

    // and the standalone explainer derives the same value from the forest
    let explainer = TreeExplainer::new(model.forest()).unwrap();
    assert_relative_eq!(explainer.base_value(), model.baseline(), epsilon = 1e-12);
}

#[test]
fn one_attribution_per_feature() {
    let (training, model) = fitted_model(30);
    let x = training.iter().next().unwrap().features;
    let attributions = model.explain(&x).unwrap();

    let json = serde_json::to_value(attributions).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), FIELD_NAMES.len());
    for name in FIELD_NAMES {
        assert!(object[name].is_number());
    }
}

#[test]
fn attributions_respond_to_the_input() {
    // Moving glucose from a low to a high value should move its own
    // attribution upward; explanations are not constants.
    let (_, model) = fitted_model(80);

    let low = FeatureVector::from_array([2.0, 85.0, 70.0, 25.0, 80.0, 30.0, 0.4, 30.0]);
    let high = FeatureVector::from_array([2.0, 190.0, 70.0, 25.0, 80.0, 30.0, 0.4, 30.0]);

    let low_attr = model.explain(&low).unwrap();
    let high_attr = model.explain(&high).unwrap();
    assert!(
        high_attr.glucose > low_attr.glucose,
        "glucose attribution did not increase: {} -> {}",
        low_attr.glucose,
        high_attr.glucose
    );
}

#[test]
fn explanations_are_deterministic() {
    let (training, model) = fitted_model(40);
    let x = training.iter().nth(4).unwrap().features;

    let first: Attributions = model.explain(&x).unwrap();
    let second: Attributions = model.explain(&x).unwrap();
    assert_eq!(first, second);
}

#[test]
fn top_by_magnitude_is_a_permutation_prefix() {
    let (training, model) = fitted_model(40);
    let x = training.iter().next().unwrap().features;
    let attributions = model.explain(&x).unwrap();

    let top = attributions.top_by_magnitude(8);
    assert_eq!(top.len(), 8);
    let mut names: Vec<&str> = top.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    let mut expected: Vec<&str> = FIELD_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);

    for window in top.windows(2) {
        assert!(window[0].1.abs() >= window[1].1.abs());
    }
}
