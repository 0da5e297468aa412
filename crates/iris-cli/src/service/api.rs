//! Wire types shared by the prediction service and its clients.
use serde::{Deserialize, Serialize};

use iris_classifiers::{FeatureMap, Prediction};

/// Body of every `POST /predict` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictResponse {
    Success {
        prediction: String,
        class_index: usize,
        input_features: FeatureMap,
    },
    Error {
        message: String,
    },
}

impl PredictResponse {
    pub fn error(message: impl Into<String>) -> Self {
        PredictResponse::Error {
            message: message.into(),
        }
    }
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        let input_features = prediction.input_features_map();
        PredictResponse::Success {
            prediction: prediction.label,
            class_index: prediction.class_index,
            input_features,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        HealthResponse {
            status: "healthy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_is_tagged_with_status() {
        let mut features = FeatureMap::new();
        features.insert("sepal_length".into(), json!(5.1));
        let response = PredictResponse::Success {
            prediction: "setosa".into(),
            class_index: 0,
            input_features: features,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["prediction"], "setosa");
        assert_eq!(value["input_features"]["sepal_length"], json!(5.1));
    }

    #[test]
    fn error_is_tagged_with_status() {
        let value = serde_json::to_value(PredictResponse::error("boom")).unwrap();
        assert_eq!(value, json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn health_body() {
        let value = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(value, json!({"status": "healthy"}));
    }
}
