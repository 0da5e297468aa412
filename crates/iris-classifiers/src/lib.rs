//! iris-classifiers: support vector machine training and inference for the
//! Iris flower dataset.
//!
//! The crate reads a labeled measurement table, fits a one-vs-rest SVM with
//! probability estimates, and persists it together with the feature ordering
//! it was trained on. [`predictor::Predictor`] loads that bundle lazily and
//! trains it on demand when no artifact exists yet.
pub mod bundle;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod features;
pub mod models;
pub mod predictor;
pub mod stats;
pub mod training;

pub use bundle::{ModelBundle, Prediction, TrainingMetrics};
pub use config::{KernelType, SvmConfig, TrainConfig};
pub use error::{IrisError, Result};
pub use features::{FeatureMap, IrisFeatures};
pub use predictor::Predictor;
