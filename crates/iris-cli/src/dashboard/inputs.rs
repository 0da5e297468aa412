//! Dashboard input handling: slider bounds, uploaded files and the
//! class-index lookup table.
use serde::Deserialize;
use serde_json::Value;

use iris_classifiers::FeatureMap;

/// A bounded numeric slider for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl SliderSpec {
    /// Bring `value` into `[min, max]`. Non-finite values fall back to the
    /// default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

pub const SLIDERS: [SliderSpec; 4] = [
    SliderSpec {
        name: "sepal_length",
        label: "Sepal Length",
        min: 4.3,
        max: 7.9,
        default: 5.8,
        step: 0.1,
    },
    SliderSpec {
        name: "sepal_width",
        label: "Sepal Width",
        min: 2.0,
        max: 4.4,
        default: 3.0,
        step: 0.1,
    },
    SliderSpec {
        name: "petal_length",
        label: "Petal Length",
        min: 1.0,
        max: 6.9,
        default: 4.3,
        step: 0.1,
    },
    SliderSpec {
        name: "petal_width",
        label: "Petal Width",
        min: 0.1,
        max: 2.5,
        default: 1.3,
        step: 0.1,
    },
];

pub fn default_slider_values() -> [f64; 4] {
    SLIDERS.map(|s| s.default)
}

/// Clamp each submitted value to its slider; a missing value takes the default.
pub fn clamp_slider_values(values: [Option<f64>; 4]) -> [f64; 4] {
    let mut out = default_slider_values();
    for (slot, (spec, value)) in out.iter_mut().zip(SLIDERS.iter().zip(values)) {
        if let Some(v) = value {
            *slot = spec.clamp(v);
        }
    }
    out
}

pub fn slider_features(values: &[f64; 4]) -> FeatureMap {
    SLIDERS
        .iter()
        .zip(values.iter())
        .map(|(spec, v)| (spec.name.to_string(), Value::from(*v)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Manual,
    Upload,
}

/// Outcome of reading an uploaded JSON file.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    /// Parsed, with the `input_test` object extracted.
    Valid { preview: String, features: FeatureMap },
    /// Parsed JSON without an `input_test` object.
    MissingKey { preview: String },
    InvalidJson(String),
    TooLarge { limit: usize },
}

impl UploadState {
    pub fn features(&self) -> Option<&FeatureMap> {
        match self {
            UploadState::Valid { features, .. } => Some(features),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<&str> {
        match self {
            UploadState::Valid { preview, .. } | UploadState::MissingKey { preview } => {
                Some(preview)
            }
            _ => None,
        }
    }
}

pub const UPLOAD_KEY: &str = "input_test";

/// Parse an uploaded file. Only a top-level object with an object under
/// `input_test` yields usable features.
pub fn parse_upload(bytes: &[u8], limit: usize) -> UploadState {
    if bytes.len() > limit {
        return UploadState::TooLarge { limit };
    }

    let document: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => return UploadState::InvalidJson(e.to_string()),
    };
    let preview = serde_json::to_string_pretty(&document).unwrap_or_default();

    match document.get(UPLOAD_KEY) {
        Some(Value::Object(features)) => UploadState::Valid {
            preview,
            features: features.clone(),
        },
        _ => UploadState::MissingKey { preview },
    }
}

/// Display data for one species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrisClass {
    pub name: &'static str,
    pub image: &'static str,
}

pub const IRIS_CLASSES: [IrisClass; 3] = [
    IrisClass {
        name: "Setosa",
        image: "/assets/setosa.svg",
    },
    IrisClass {
        name: "Versicolor",
        image: "/assets/versicolor.svg",
    },
    IrisClass {
        name: "Virginica",
        image: "/assets/virginica.svg",
    },
];

pub fn class_for_index(index: i64) -> Option<&'static IrisClass> {
    usize::try_from(index)
        .ok()
        .and_then(|i| IRIS_CLASSES.get(i))
}
