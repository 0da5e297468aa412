//! Request-side feature handling.
//!
//! Prediction input arrives as a name → value map. The model only knows
//! column positions, so every request is reordered against the feature names
//! recorded at training time before inference. Key order in the request never
//! matters.
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IrisError, Result};

/// JSON object of feature name → value, as received over the wire.
pub type FeatureMap = Map<String, Value>;

/// Column names of the bundled Iris dataset, in file order.
pub const IRIS_FEATURE_NAMES: [&str; 4] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// The four Iris measurements, in centimeters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IrisFeatures {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl IrisFeatures {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// The textbook setosa sample used by smoke tests and `iris predict`.
    pub fn canonical_sample() -> Self {
        Self::new(5.1, 3.5, 1.4, 0.2)
    }

    /// Values in [`IRIS_FEATURE_NAMES`] order.
    pub fn values(&self) -> [f64; 4] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    pub fn to_map(&self) -> FeatureMap {
        IRIS_FEATURE_NAMES
            .iter()
            .zip(self.values())
            .map(|(name, value)| (name.to_string(), Value::from(value)))
            .collect()
    }
}

/// Coerce a JSON value to a finite `f64`. Numbers and numeric strings are
/// accepted; anything else is rejected.
pub fn coerce_numeric(name: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(IrisError::InvalidFeature {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Pull every name in `feature_names` out of `input` and lay the values out
/// as a single-row matrix in that order. Extra keys are ignored.
///
/// # Returns
///
/// The `(1, n)` matrix and the coerced values keyed by name, in model order.
pub fn order_features(
    feature_names: &[String],
    input: &FeatureMap,
) -> Result<(Array2<f64>, Vec<(String, f64)>)> {
    let mut ordered = Vec::with_capacity(feature_names.len());
    for name in feature_names {
        let value = input
            .get(name)
            .ok_or_else(|| IrisError::MissingFeature(name.clone()))?;
        ordered.push((name.clone(), coerce_numeric(name, value)?));
    }

    let row = ordered.iter().map(|(_, v)| *v).collect::<Vec<_>>();
    let x = Array2::from_shape_vec((1, row.len()), row)?;
    Ok((x, ordered))
}

/// Same as [`order_features`] for an arbitrary JSON value; anything other than
/// an object is rejected.
pub fn order_features_from_value(
    feature_names: &[String],
    input: &Value,
) -> Result<(Array2<f64>, Vec<(String, f64)>)> {
    match input {
        Value::Object(map) => order_features(feature_names, map),
        _ => Err(IrisError::NotAnObject),
    }
}
