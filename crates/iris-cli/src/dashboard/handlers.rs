//! Dashboard routes. Every page render polls the backend's `/health`; a
//! prediction additionally posts the collected features to `/predict`.
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;

use iris_classifiers::FeatureMap;

use crate::client::{BackendClient, BackendStatus, ClientError, PredictSuccess};
use crate::dashboard::inputs::{
    class_for_index, clamp_slider_values, default_slider_values, parse_upload, slider_features,
    InputMode, UploadState,
};
use crate::dashboard::view::{render_page, PageState, ResultView};
use crate::dashboard::DashboardState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub mode: InputMode,
}

/// Form posted by the Predict button.
#[derive(Debug, Default, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub mode: InputMode,
    pub sepal_length: Option<f64>,
    pub sepal_width: Option<f64>,
    pub petal_length: Option<f64>,
    pub petal_width: Option<f64>,
    /// Features of a previously validated upload, as a JSON object.
    pub payload: Option<String>,
    /// The uploaded document as it was previewed.
    pub preview: Option<String>,
}

pub async fn index(
    State(state): State<DashboardState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let backend = backend_status(&state).await;
    render(PageState {
        mode: query.mode,
        sliders: default_slider_values(),
        upload: None,
        result: ResultView::Idle,
        backend,
    })
}

pub async fn predict_form(
    State(state): State<DashboardState>,
    Form(form): Form<PredictForm>,
) -> Html<String> {
    let mode = form.mode;
    let (sliders, features, upload) = collect_features(form);

    let outcome = with_client(&state, move |client| {
        let backend = client.health();
        let prediction = features.map(|f| client.predict(&f));
        (backend, prediction)
    })
    .await;

    let (backend, result) = match outcome {
        Ok((backend, Some(prediction))) => (backend, result_view(prediction)),
        Ok((backend, None)) => (backend, ResultView::NoInput),
        Err(e) => {
            log::error!("Prediction request failed: {}", e);
            (BackendStatus::Offline(e), ResultView::Failed)
        }
    };

    render(PageState {
        mode,
        sliders,
        upload,
        result,
        backend,
    })
}

pub async fn upload(State(state): State<DashboardState>, mut multipart: Multipart) -> Html<String> {
    let limit = state.config.max_upload_bytes;
    let mut upload = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                upload = match field.bytes().await {
                    Ok(bytes) if bytes.is_empty() => None,
                    Ok(bytes) => Some(parse_upload(&bytes, limit)),
                    Err(e) => Some(multipart_failure(e, limit)),
                };
                break;
            }
            Ok(None) => break,
            Err(e) => {
                upload = Some(multipart_failure(e, limit));
                break;
            }
        }
    }

    if let Some(UploadState::InvalidJson(e)) = &upload {
        log::warn!("Uploaded file is not valid JSON: {}", e);
    }

    let backend = backend_status(&state).await;
    render(PageState {
        mode: InputMode::Upload,
        sliders: default_slider_values(),
        upload,
        result: ResultView::Idle,
        backend,
    })
}

/// Serve an illustration from the assets directory.
pub async fn asset(State(state): State<DashboardState>, Path(file): Path<String>) -> Response {
    if !is_safe_file_name(&file) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.config.assets_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) => {
            log::warn!("Asset {} unavailable: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn render(page: PageState) -> Html<String> {
    Html(render_page(&page).into_string())
}

/// Turn the submitted form into slider positions, the features to send (if
/// any) and, in upload mode, the upload to re-render.
fn collect_features(form: PredictForm) -> ([f64; 4], Option<FeatureMap>, Option<UploadState>) {
    match form.mode {
        InputMode::Manual => {
            let sliders = clamp_slider_values([
                form.sepal_length,
                form.sepal_width,
                form.petal_length,
                form.petal_width,
            ]);
            (sliders, Some(slider_features(&sliders)), None)
        }
        InputMode::Upload => {
            let features = form
                .payload
                .and_then(|p| serde_json::from_str::<FeatureMap>(&p).ok());
            let preview = form.preview;
            let upload = features.as_ref().map(|f| UploadState::Valid {
                preview: preview.unwrap_or_else(|| {
                    serde_json::to_string_pretty(&json!({ "input_test": f })).unwrap_or_default()
                }),
                features: f.clone(),
            });
            (default_slider_values(), features, upload)
        }
    }
}

fn result_view(prediction: Result<PredictSuccess, ClientError>) -> ResultView {
    match prediction {
        Ok(success) => match class_for_index(success.class_index) {
            Some(class) => ResultView::Predicted(class),
            None => {
                log::error!(
                    "Unexpected prediction: {} (index {})",
                    success.prediction,
                    success.class_index
                );
                ResultView::Unexpected(success.class_index)
            }
        },
        Err(e) => {
            log::error!("Prediction request failed: {}", e);
            ResultView::Failed
        }
    }
}

fn multipart_failure(e: axum::extract::multipart::MultipartError, limit: usize) -> UploadState {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadState::TooLarge { limit }
    } else {
        UploadState::InvalidJson(e.body_text())
    }
}

async fn backend_status(state: &DashboardState) -> BackendStatus {
    match with_client(state, |client| client.health()).await {
        Ok(status) => status,
        Err(e) => BackendStatus::Offline(e),
    }
}

/// Run `f` against a fresh blocking client on tokio's blocking pool.
async fn with_client<T, F>(state: &DashboardState, f: F) -> Result<T, String>
where
    F: FnOnce(&BackendClient) -> T + Send + 'static,
    T: Send + 'static,
{
    let url = state.config.backend_url.clone();
    let timeout = state.config.timeout_secs;
    tokio::task::spawn_blocking(move || {
        let client = BackendClient::new(&url, timeout).map_err(|e| e.to_string())?;
        Ok(f(&client))
    })
    .await
    .map_err(|e| e.to_string())?
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn content_type(name: &str) -> &'static str {
    match name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::DashboardConfig;

    fn offline_state(assets: std::path::PathBuf) -> DashboardState {
        DashboardState {
            config: Arc::new(DashboardConfig {
                backend_url: "http://127.0.0.1:9".to_string(),
                assets_dir: assets,
                timeout_secs: Some(2),
                ..DashboardConfig::default()
            }),
        }
    }

    #[test]
    fn file_name_sanitizer() {
        assert!(is_safe_file_name("setosa.svg"));
        assert!(is_safe_file_name("iris-virginica_2.png"));
        assert!(!is_safe_file_name("../secret"));
        assert!(!is_safe_file_name(".hidden"));
        assert!(!is_safe_file_name("a/b.svg"));
        assert!(!is_safe_file_name(""));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type("setosa.svg"), "image/svg+xml");
        assert_eq!(content_type("photo.JPG"), "image/jpeg");
        assert_eq!(content_type("notes"), "application/octet-stream");
    }

    #[test]
    fn manual_form_is_clamped() {
        let form = PredictForm {
            sepal_length: Some(12.0),
            petal_width: Some(0.0),
            ..PredictForm::default()
        };
        let (sliders, features, upload) = collect_features(form);
        assert_eq!(sliders, [7.9, 3.0, 4.3, 0.1]);
        assert!(upload.is_none());
        let features = features.unwrap();
        assert_eq!(features["sepal_length"], json!(7.9));
    }

    #[test]
    fn upload_form_without_payload_has_no_features() {
        let form = PredictForm {
            mode: InputMode::Upload,
            ..PredictForm::default()
        };
        let (_, features, upload) = collect_features(form);
        assert!(features.is_none());
        assert!(upload.is_none());
    }

    #[test]
    fn upload_form_keeps_the_original_preview() {
        let original = r#"{"id": 42, "input_test": {"sepal_length": 5.1}}"#.to_string();
        let form = PredictForm {
            mode: InputMode::Upload,
            payload: Some(r#"{"sepal_length": 5.1}"#.to_string()),
            preview: Some(original.clone()),
            ..PredictForm::default()
        };
        let (_, features, upload) = collect_features(form);
        assert_eq!(features.unwrap()["sepal_length"], json!(5.1));
        let upload = upload.unwrap();
        assert_eq!(upload.preview(), Some(original.as_str()));
    }

    #[test]
    fn unexpected_class_index() {
        let success = PredictSuccess {
            status: "success".into(),
            prediction: "rose".into(),
            class_index: 7,
            input_features: FeatureMap::new(),
        };
        assert_eq!(result_view(Ok(success)), ResultView::Unexpected(7));
    }

    #[tokio::test]
    async fn offline_backend_renders_failure() {
        let dir = tempfile::tempdir().unwrap();
        let state = offline_state(dir.path().to_path_buf());
        let Html(page) = predict_form(State(state), Form(PredictForm::default())).await;
        assert!(page.contains("Backend offline"));
        assert!(page.contains("Failed to get a prediction from the backend."));
    }

    #[tokio::test]
    async fn upload_mode_without_input_asks_for_input() {
        let dir = tempfile::tempdir().unwrap();
        let state = offline_state(dir.path().to_path_buf());
        let form = PredictForm {
            mode: InputMode::Upload,
            ..PredictForm::default()
        };
        let Html(page) = predict_form(State(state), Form(form)).await;
        assert!(page.contains("Please provide valid input before predicting."));
    }

    #[tokio::test]
    async fn assets_are_served_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setosa.svg"), "<svg/>").unwrap();
        let state = offline_state(dir.path().to_path_buf());

        let response = asset(State(state.clone()), Path("setosa.svg".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

        let response = asset(State(state), Path("missing.svg".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
