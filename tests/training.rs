//! Model fitting integration tests: determinism, bounds, failure modes.

use riskforest::{
    FeatureSampling, FeatureVector, FitError, ForestConfig, Outcome, RiskModel, TrainingSet,
};

fn config(n_trees: u32, seed: u64) -> ForestConfig {
    ForestConfig::builder()
        .n_trees(n_trees)
        .max_depth(6)
        .seed(seed)
        .build()
        .unwrap()
}

fn probes() -> Vec<FeatureVector> {
    vec![
        FeatureVector::from_array([6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0]),
        FeatureVector::from_array([1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0]),
        FeatureVector::from_array([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
        FeatureVector::from_array([14.0, 300.0, 120.0, 60.0, 1000.0, 55.0, 3.5, 90.0]),
    ]
}

#[test]
fn fixed_seed_reproduces_predictions_exactly() {
    let training = TrainingSet::reference_sample();
    let a = RiskModel::fit(&training, config(50, 42)).unwrap();
    let b = RiskModel::fit(&training, config(50, 42)).unwrap();

    for probe in probes() {
        assert_eq!(a.predict(&probe), b.predict(&probe));
        assert_eq!(a.explain(&probe).unwrap(), b.explain(&probe).unwrap());
    }
    assert_eq!(a.baseline(), b.baseline());
}

#[test]
fn thread_count_does_not_change_the_model() {
    let training = TrainingSet::reference_sample();
    let sequential = ForestConfig::builder()
        .n_trees(40)
        .max_depth(6)
        .n_threads(1)
        .build()
        .unwrap();
    let parallel = ForestConfig::builder()
        .n_trees(40)
        .max_depth(6)
        .n_threads(4)
        .build()
        .unwrap();

    let a = RiskModel::fit(&training, sequential).unwrap();
    let b = RiskModel::fit(&training, parallel).unwrap();
    for probe in probes() {
        assert_eq!(a.predict(&probe), b.predict(&probe));
    }
}

#[test]
fn probabilities_stay_in_unit_interval() {
    let training = TrainingSet::reference_sample();
    let model = RiskModel::fit(&training, config(60, 42)).unwrap();

    for probe in probes() {
        let p = model.predict(&probe);
        assert!((0.0..=1.0).contains(&p), "probability {p} out of range");
    }
}

#[test]
fn training_rows_score_toward_their_labels() {
    // In-sample fit quality: the ensemble should place most training rows
    // on the correct side of 0.5.
    let training = TrainingSet::reference_sample();
    let model = RiskModel::fit(&training, config(100, 42)).unwrap();

    let correct = training
        .iter()
        .filter(|example| {
            let p = model.predict(&example.features);
            match example.outcome {
                Outcome::Positive => p > 0.5,
                Outcome::Negative => p < 0.5,
            }
        })
        .count();
    assert!(
        correct >= 17,
        "only {correct}/20 training rows classified correctly in-sample"
    );
}

#[test]
fn single_class_training_fails_with_insufficient_data() {
    let negatives: Vec<_> = TrainingSet::reference_sample()
        .iter()
        .filter(|e| e.outcome == Outcome::Negative)
        .copied()
        .collect();
    let err = RiskModel::fit(&TrainingSet::new(negatives), config(10, 42)).unwrap_err();
    assert!(matches!(
        err,
        FitError::InsufficientData { positives: 0, .. }
    ));
}

#[test]
fn forest_structure_is_valid_and_sized() {
    let training = TrainingSet::reference_sample();
    let model = RiskModel::fit(&training, config(35, 9)).unwrap();

    let forest = model.forest();
    assert_eq!(forest.n_trees(), 35);
    assert_eq!(forest.n_features(), 8);
    forest.validate().unwrap();

    for tree in forest.trees() {
        // depth counts nodes root-to-leaf: max_depth split levels + leaves
        assert!(tree.depth() <= 7);
        assert!(tree.has_covers());
    }
}

#[test]
fn all_feature_sampling_also_fits() {
    let training = TrainingSet::reference_sample();
    let config = ForestConfig::builder()
        .n_trees(20)
        .max_depth(6)
        .feature_sampling(FeatureSampling::All)
        .build()
        .unwrap();
    let model = RiskModel::fit(&training, config).unwrap();
    let p = model.predict(&probes()[0]);
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn csv_snapshot_trains_like_the_embedded_sample() {
    let csv = "\
Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
6,148,72,35,0,33.6,0.627,50,1
1,85,66,29,0,26.6,0.351,31,0
8,183,64,0,0,23.3,0.672,32,1
1,89,66,23,94,28.1,0.167,21,0
0,137,40,35,168,43.1,2.288,33,1
5,116,74,0,0,25.6,0.201,30,0
";
    let training = TrainingSet::from_csv_reader(csv.as_bytes()).unwrap();
    assert_eq!(training.len(), 6);
    let model = RiskModel::fit(&training, config(15, 42)).unwrap();
    assert!((0.0..=1.0).contains(&model.baseline()));
}
