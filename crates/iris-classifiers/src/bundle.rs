//! The persisted training artifact: a fitted classifier together with the
//! feature ordering it was trained on.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IrisError, Result};
use crate::features::{order_features_from_value, FeatureMap};
use crate::models::{ClassifierModel, SvmClassifier};

/// Accuracy figures reported at training time. Informational only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: SvmClassifier,
    /// Feature names in the column order the model expects.
    pub feature_names: Vec<String>,
    pub kernel: String,
    pub metrics: TrainingMetrics,
    pub trained_at: DateTime<Utc>,
}

/// Outcome of a single prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Position of `label` in the bundle's sorted class list.
    pub class_index: usize,
    /// Probability per class, in class order.
    pub probabilities: Vec<(String, f64)>,
    /// The coerced inputs, in model order.
    pub input_features: Vec<(String, f64)>,
}

impl Prediction {
    pub fn input_features_map(&self) -> FeatureMap {
        self.input_features
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(*value)))
            .collect()
    }
}

impl ModelBundle {
    pub fn class_names(&self) -> &[String] {
        self.model.classes()
    }

    /// Write the bundle as a single binary file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                log::info!("Creating model directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| IrisError::io(parent, e))?;
            }
        }
        let file = File::create(path).map_err(|e| IrisError::io(path, e))?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        log::info!("Saved model bundle to {}", path.display());
        Ok(())
    }

    /// Read a bundle written by [`ModelBundle::save`]. A missing file surfaces
    /// as `IrisError::Io` with `NotFound`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| IrisError::io(path, e))?;
        let bundle: ModelBundle = bincode::deserialize_from(BufReader::new(file))?;
        log::debug!(
            "Loaded model bundle from {} (trained {}, features: {})",
            path.display(),
            bundle.trained_at.to_rfc3339(),
            bundle.feature_names.join(", ")
        );
        Ok(bundle)
    }

    /// Validate and reorder `input` by feature name, then classify it.
    pub fn predict(&self, input: &Value) -> Result<Prediction> {
        let (x, input_features) = order_features_from_value(&self.feature_names, input)?;
        let proba = self.model.predict_proba(&x)?;
        let labels = self.model.predict(&x)?;
        let label = labels.get(0).cloned().ok_or(IrisError::EmptyDataset)?;

        let classes = self.class_names();
        let class_index = classes
            .iter()
            .position(|c| *c == label)
            .ok_or(IrisError::NotFitted)?;
        let probabilities = classes
            .iter()
            .cloned()
            .zip(proba.row(0).iter().copied())
            .collect();

        Ok(Prediction {
            label,
            class_index,
            probabilities,
            input_features,
        })
    }
}
