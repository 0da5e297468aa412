//! Integration tests for training, bundle persistence and lazy loading,
//! run against the bundled Iris CSV.

use std::path::PathBuf;

use iris_classifiers::features::{IrisFeatures, IRIS_FEATURE_NAMES};
use iris_classifiers::predictor::{load_or_train, Predictor};
use iris_classifiers::training::{fit_bundle, run_training};
use iris_classifiers::{IrisError, KernelType, ModelBundle, TrainConfig};
use serde_json::{json, Value};

fn iris_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/IRIS.csv")
}

fn config_in(dir: &tempfile::TempDir) -> TrainConfig {
    TrainConfig::new(iris_csv(), dir.path().join("model").join("model_svm.bin"))
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

#[test]
fn training_reports_high_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = fit_bundle(&config_in(&dir)).unwrap();

    assert_eq!(bundle.metrics.n_train + bundle.metrics.n_test, 150);
    assert_eq!(bundle.metrics.n_test, 38);
    assert!(bundle.metrics.train_accuracy > 0.9, "{:?}", bundle.metrics);
    assert!(bundle.metrics.test_accuracy > 0.9, "{:?}", bundle.metrics);
    assert_eq!(
        bundle.feature_names,
        vec!["sepal_length", "sepal_width", "petal_length", "petal_width"]
    );
    assert_eq!(bundle.class_names(), &["setosa", "versicolor", "virginica"]);
    assert_eq!(bundle.kernel, "gauss");
}

#[test]
fn run_training_creates_model_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    assert!(!config.model_path.parent().unwrap().exists());

    run_training(&config).unwrap();
    assert!(config.model_path.is_file());
}

#[test]
fn linear_kernel_also_trains() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir).with_kernel(KernelType::Linear);
    let bundle = fit_bundle(&config).unwrap();
    assert_eq!(bundle.kernel, "linear");
    assert!(bundle.metrics.test_accuracy > 0.6);
}

#[test]
fn missing_csv_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig::new(dir.path().join("nope.csv"), dir.path().join("m.bin"));
    assert!(matches!(fit_bundle(&config), Err(IrisError::Io { .. })));
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[test]
fn canonical_sample_is_setosa() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = fit_bundle(&config_in(&dir)).unwrap();

    let input = serde_json::Value::Object(IrisFeatures::canonical_sample().to_map());
    let prediction = bundle.predict(&input).unwrap();
    assert_eq!(prediction.label, "setosa");
    assert_eq!(prediction.class_index, 0);
    assert_eq!(prediction.probabilities.len(), 3);
}

#[test]
fn key_order_does_not_change_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = fit_bundle(&config_in(&dir)).unwrap();

    let canonical = json!({
        "sepal_length": 6.7, "sepal_width": 3.0, "petal_length": 5.2, "petal_width": 2.3
    });
    let shuffled = json!({
        "petal_width": 2.3, "petal_length": 5.2, "sepal_width": 3.0, "sepal_length": 6.7
    });
    let a = bundle.predict(&canonical).unwrap();
    let b = bundle.predict(&shuffled).unwrap();
    assert_eq!(a.label, b.label);
    assert_eq!(a.label, "virginica");
}

#[test]
fn repeated_predictions_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = fit_bundle(&config_in(&dir)).unwrap();
    let input = json!({
        "sepal_length": 5.9, "sepal_width": 3.0, "petal_length": 4.2, "petal_width": 1.5
    });
    let first = bundle.predict(&input).unwrap();
    for _ in 0..5 {
        assert_eq!(bundle.predict(&input).unwrap(), first);
    }
    assert_eq!(first.label, "versicolor");
}

#[test]
fn missing_feature_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = fit_bundle(&config_in(&dir)).unwrap();
    for name in IRIS_FEATURE_NAMES {
        let mut input = IrisFeatures::canonical_sample().to_map();
        input.remove(name);
        let err = bundle.predict(&Value::Object(input)).unwrap_err();
        match err {
            IrisError::MissingFeature(missing) => assert_eq!(missing, name),
            other => panic!("unexpected error for {name}: {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence and lazy loading
// ---------------------------------------------------------------------------

#[test]
fn bundle_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let trained = run_training(&config).unwrap();
    let loaded = ModelBundle::load(&config.model_path).unwrap();

    assert_eq!(loaded.feature_names, trained.feature_names);
    assert_eq!(loaded.metrics, trained.metrics);
    assert_eq!(loaded.trained_at, trained.trained_at);

    let input = json!({
        "sepal_length": 6.1, "sepal_width": 2.8, "petal_length": 4.7, "petal_width": 1.2
    });
    assert_eq!(
        loaded.predict(&input).unwrap().label,
        trained.predict(&input).unwrap().label
    );
}

#[test]
fn load_or_train_trains_only_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let first = load_or_train(&config).unwrap();
    assert!(config.model_path.is_file());

    let second = load_or_train(&config).unwrap();
    assert_eq!(first.trained_at, second.trained_at);
}

#[test]
fn corrupt_artifact_is_not_retrained() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    std::fs::create_dir_all(config.model_path.parent().unwrap()).unwrap();
    std::fs::write(&config.model_path, b"not a model").unwrap();

    assert!(matches!(
        load_or_train(&config),
        Err(IrisError::Serialization(_))
    ));
}

#[test]
fn predictor_initializes_on_first_use() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new(config_in(&dir));
    assert!(!predictor.is_loaded());

    let prediction = predictor
        .predict(&json!({
            "sepal_length": 5.1, "sepal_width": 3.5, "petal_length": 1.4, "petal_width": 0.2
        }))
        .unwrap();
    assert_eq!(prediction.label, "setosa");
    assert!(predictor.is_loaded());
    assert!(predictor.config().model_path.is_file());
}

#[test]
fn predictor_retries_after_failed_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("late.csv");
    let config = TrainConfig::new(&data, dir.path().join("model.bin"));
    let predictor = Predictor::new(config);

    assert!(predictor.bundle().is_err());
    assert!(!predictor.is_loaded());

    std::fs::copy(iris_csv(), &data).unwrap();
    assert!(predictor.bundle().is_ok());
    assert!(predictor.is_loaded());
}
