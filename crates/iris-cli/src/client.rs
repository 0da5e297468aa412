//! Blocking HTTP client for the prediction service.
//!
//! `reqwest::blocking` spins up its own runtime, so a `BackendClient` must be
//! built and used off the async executor (inside `spawn_blocking` or from a
//! plain thread).
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use iris_classifiers::FeatureMap;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to create HTTP client: {0}")]
    Build(reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Unexpected(String),
}

/// Liveness of the service as seen from the client.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    Online,
    Unhealthy(u16),
    Offline(String),
}

/// Successful `/predict` body.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PredictSuccess {
    pub status: String,
    pub prediction: String,
    /// Kept signed so an out-of-range value from a foreign backend still decodes.
    pub class_index: i64,
    #[serde(default)]
    pub input_features: FeatureMap,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct BackendClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl BackendClient {
    /// `timeout_secs = None` waits indefinitely.
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("iris-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health`. Never fails; transport errors become `Offline`.
    pub fn health(&self) -> BackendStatus {
        let url = self.url("/health");
        match self.http.get(&url).send() {
            Ok(response) if response.status().is_success() => BackendStatus::Online,
            Ok(response) => BackendStatus::Unhealthy(response.status().as_u16()),
            Err(e) => {
                log::debug!("Health check against {} failed: {}", url, e);
                BackendStatus::Offline(e.to_string())
            }
        }
    }

    /// `POST /predict` with `features` as the JSON body.
    pub fn predict(&self, features: &FeatureMap) -> Result<PredictSuccess, ClientError> {
        let url = self.url("/predict");
        let response = self
            .http
            .post(&url)
            .json(features)
            .send()
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ClientError::Status {
                code: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<PredictSuccess>(&body)
            .map_err(|e| ClientError::Unexpected(format!("{}: {}", e, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = BackendClient::new("http://localhost:8080/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/health"), "http://localhost:8080/health");
    }

    #[test]
    fn unreachable_backend_is_offline() {
        // Port 9 (discard) is closed on test machines.
        let client = BackendClient::new("http://127.0.0.1:9", Some(2)).unwrap();
        assert!(matches!(client.health(), BackendStatus::Offline(_)));

        let err = client.predict(&FeatureMap::new()).unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[test]
    fn success_body_decodes() {
        let body = r#"{"status":"success","prediction":"setosa","class_index":0,
                       "input_features":{"sepal_length":5.1}}"#;
        let parsed: PredictSuccess = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.prediction, "setosa");
        assert_eq!(parsed.class_index, 0);
    }
}
