use std::time::Instant;

use chrono::Utc;

use crate::bundle::{ModelBundle, TrainingMetrics};
use crate::config::TrainConfig;
use crate::data_handling::load_dataset;
use crate::error::Result;
use crate::models::{ClassifierModel, SvmClassifier};
use crate::stats::accuracy;

/// Load the CSV, split it, fit the SVM and report accuracy. Nothing is written
/// to disk.
pub fn fit_bundle(config: &TrainConfig) -> Result<ModelBundle> {
    let dataset = load_dataset(&config.data_path, &config.label_column)?;
    dataset.log_input_data_summary();

    let (train, test) = dataset.train_test_split(config.test_size, config.seed)?;
    log::debug!(
        "Split {} samples into {} train / {} test (seed {})",
        dataset.nrows(),
        train.nrows(),
        test.nrows(),
        config.seed
    );

    let start = Instant::now();
    let mut model = SvmClassifier::new(config.svm.clone());
    model.fit(&train.x, &train.y)?;
    log::debug!("Fitted {} in {:?}", model.name(), start.elapsed());

    let train_accuracy = accuracy(&model.predict(&train.x)?, &train.y);
    let test_accuracy = accuracy(&model.predict(&test.x)?, &test.y);
    log::info!("Training Accuracy: {:.4}", train_accuracy);
    log::info!("Testing Accuracy: {:.4}", test_accuracy);

    Ok(ModelBundle {
        model,
        feature_names: dataset.feature_names.clone(),
        kernel: config.svm.kernel.name().to_string(),
        metrics: TrainingMetrics {
            train_accuracy,
            test_accuracy,
            n_train: train.nrows(),
            n_test: test.nrows(),
        },
        trained_at: Utc::now(),
    })
}

/// Train and persist the bundle to `config.model_path`.
pub fn run_training(config: &TrainConfig) -> Result<ModelBundle> {
    log::info!(
        "Training SVM on {} -> {}",
        config.data_path.display(),
        config.model_path.display()
    );
    let bundle = fit_bundle(config)?;
    bundle.save(&config.model_path)?;
    Ok(bundle)
}
