use ndarray::{Array1, Array2};

use crate::error::Result;

/// The contract the training routine and the predictor rely on. Labels are
/// class names; `classes()` fixes the column order of `predict_proba`.
pub trait ClassifierModel {
    /// Fit the model on rows of `x` labeled by `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<String>) -> Result<()>;

    /// Predict one class label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<String>>;

    /// Per-class probability estimates, one row per sample and one column per
    /// entry of `classes()`. Rows sum to one.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Class labels seen during fitting, sorted.
    fn classes(&self) -> &[String];

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
