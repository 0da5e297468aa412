use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading data, training, persisting or querying a model.
#[derive(Debug, Error)]
pub enum IrisError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing label column '{0}' in CSV header")]
    MissingLabelColumn(String),

    #[error("Could not parse value '{value}' in column '{column}' (row {row}) as a number")]
    InvalidCell {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Training data needs at least two classes, found {0}")]
    SingleClass(usize),

    #[error("Invalid test size {0}: must be in (0, 1)")]
    InvalidTestSize(f64),

    #[error("Unknown kernel type: {0}. Valid options are: linear, gauss, poly")]
    UnknownKernel(String),

    #[error("SVM training failed: {0}")]
    Svm(#[from] linfa_svm::SvmError),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Model serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Missing required feature '{0}'")]
    MissingFeature(String),

    #[error("Feature '{name}' must be numeric, got {value}")]
    InvalidFeature { name: String, value: String },

    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Request body must be a JSON object of feature values")]
    NotAnObject,
}

impl IrisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IrisError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IrisError>;
