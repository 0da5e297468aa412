//! HTML rendering for the dashboard page.
use maud::{html, Markup, DOCTYPE};

use crate::client::BackendStatus;
use crate::dashboard::inputs::{InputMode, IrisClass, UploadState, SLIDERS};

/// Result panel contents.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Idle,
    NoInput,
    Predicted(&'static IrisClass),
    Unexpected(i64),
    Failed,
}

/// Everything one render of the page needs.
#[derive(Debug, Clone)]
pub struct PageState {
    pub mode: InputMode,
    pub sliders: [f64; 4],
    pub upload: Option<UploadState>,
    pub result: ResultView,
    pub backend: BackendStatus,
}

impl PageState {
    /// Features are available for submission and the backend answered the
    /// last liveness poll.
    pub fn can_predict(&self) -> bool {
        if matches!(self.backend, BackendStatus::Offline(_)) {
            return false;
        }
        match self.mode {
            InputMode::Manual => true,
            InputMode::Upload => self
                .upload
                .as_ref()
                .and_then(UploadState::features)
                .is_some(),
        }
    }
}

const STYLE: &str = "
body { font-family: sans-serif; margin: 0; display: flex; }
aside { width: 260px; min-height: 100vh; background: #f0f2f6; padding: 16px; }
main { flex: 1; padding: 16px 32px; }
.columns { display: flex; gap: 32px; }
.columns > section { flex: 1; }
.result { height: 350px; border: 1px solid #ddd; border-radius: 8px; padding: 12px; overflow: auto; }
.success { color: #0f5132; background: #d1e7dd; padding: 8px; border-radius: 4px; }
.info { color: #055160; background: #cff4fc; padding: 8px; border-radius: 4px; }
.warning { color: #664d03; background: #fff3cd; padding: 8px; border-radius: 4px; }
.error { color: #842029; background: #f8d7da; padding: 8px; border-radius: 4px; }
.toast { position: fixed; right: 16px; bottom: 16px; color: #842029; background: #fff; border: 1px solid #842029; padding: 8px 12px; border-radius: 4px; }
pre { background: #f5f5f5; padding: 8px; max-height: 160px; overflow: auto; }
button { width: 100%; padding: 8px; }
";

pub fn render_page(state: &PageState) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Iris Flower Prediction" }
                style { (STYLE) }
            }
            body {
                (sidebar(&state.backend))
                main {
                    h1 { "Iris Flower Prediction! 🪻" }
                    p { "Predict the species of an Iris flower using its measurements." }
                    div class="columns" {
                        section { (input_column(state)) }
                        section {
                            h2 { "Prediction" }
                            div class="result" { (result_panel(&state.result)) }
                        }
                    }
                }
                @if state.result == ResultView::Failed {
                    div class="toast" { "🔴 Problem connecting to the backend. Please check its status." }
                }
            }
        }
    }
}

fn sidebar(backend: &BackendStatus) -> Markup {
    html! {
        aside {
            h2 { "Backend Status" }
            @match backend {
                BackendStatus::Online => p class="success" { "Backend online ✅" },
                BackendStatus::Unhealthy(code) => {
                    p class="warning" { "Backend returned status code " (code) ". 😭" }
                },
                BackendStatus::Offline(_) => p class="error" { "Backend offline 😱" },
            }
            p class="info" {
                "This dashboard interacts with a prediction service to predict Iris flower species."
            }
        }
    }
}

fn input_column(state: &PageState) -> Markup {
    html! {
        h2 { "Input Type" }
        form method="get" action="/" {
            label for="mode" { "Select input type" }
            select id="mode" name="mode" onchange="this.form.submit()" {
                option value="manual" selected[state.mode == InputMode::Manual] { "Manual Input (Sliders)" }
                option value="upload" selected[state.mode == InputMode::Upload] { "File Upload" }
            }
        }
        @match state.mode {
            InputMode::Manual => (manual_form(state)),
            InputMode::Upload => (upload_forms(state)),
        }
    }
}

fn manual_form(state: &PageState) -> Markup {
    html! {
        h3 { "Enter Measurements (in cm)" }
        form method="post" action="/predict" {
            input type="hidden" name="mode" value="manual";
            @for (spec, value) in SLIDERS.iter().zip(state.sliders.iter()) {
                p {
                    label for=(spec.name) { (spec.label) ": " output { (format!("{:.1}", value)) } }
                    br;
                    input type="range" id=(spec.name) name=(spec.name)
                        min=(spec.min) max=(spec.max) step=(spec.step) value=(format!("{:.1}", value))
                        oninput="this.previousElementSibling.previousElementSibling.querySelector('output').value = Number(this.value).toFixed(1)";
                }
            }
            button type="submit" disabled[!state.can_predict()] { "Predict" }
        }
    }
}

fn upload_forms(state: &PageState) -> Markup {
    html! {
        h3 { "Upload a JSON File" }
        form method="post" action="/upload" enctype="multipart/form-data" {
            input type="file" name="file" accept=".json,application/json";
            small { "Limit 200KB per file • JSON" }
            button type="submit" { "Upload" }
        }
        @if let Some(upload) = &state.upload {
            @if let Some(preview) = upload.preview() {
                details { summary { "Uploaded file" } pre { (preview) } }
            }
            @match upload {
                UploadState::MissingKey { .. } => p class="warning" {
                    "Invalid JSON format. The file must contain an 'input_test' key with the feature dictionary."
                },
                UploadState::InvalidJson(_) => p class="error" {
                    "Invalid JSON file. Please upload a correctly formatted file."
                },
                UploadState::TooLarge { limit, .. } => p class="error" {
                    "File exceeds the " (limit / 1024) "KB upload limit."
                },
                UploadState::Valid { .. } => {},
            }
        }
        form method="post" action="/predict" {
            input type="hidden" name="mode" value="upload";
            @if let Some(features) = state.upload.as_ref().and_then(UploadState::features) {
                input type="hidden" name="payload"
                    value=(serde_json::to_string(features).unwrap_or_default());
                @if let Some(preview) = state.upload.as_ref().and_then(UploadState::preview) {
                    input type="hidden" name="preview" value=(preview);
                }
            }
            button type="submit" disabled[!state.can_predict()] { "Predict" }
        }
    }
}

fn result_panel(result: &ResultView) -> Markup {
    html! {
        @match result {
            ResultView::Idle => p class="info" { "Click 'Predict' to see the result." },
            ResultView::NoInput => p class="warning" { "Please provide valid input before predicting." },
            ResultView::Predicted(class) => {
                p class="success" { "The model predicts: " strong { (class.name) } }
                figure {
                    img src=(class.image) alt=(format!("Iris {}", class.name)) width="100%";
                    figcaption { "Iris " (class.name) }
                }
            },
            ResultView::Unexpected(_) => p class="error" {
                "An unexpected prediction value was received from the model."
            },
            ResultView::Failed => p class="error" { "Failed to get a prediction from the backend." },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::inputs::{default_slider_values, parse_upload, IRIS_CLASSES};

    fn state(mode: InputMode) -> PageState {
        PageState {
            mode,
            sliders: default_slider_values(),
            upload: None,
            result: ResultView::Idle,
            backend: BackendStatus::Online,
        }
    }

    #[test]
    fn idle_page() {
        let page = render_page(&state(InputMode::Manual)).into_string();
        assert!(page.contains("Backend online ✅"));
        assert!(page.contains("Click 'Predict' to see the result."));
        assert!(page.contains("name=\"petal_width\""));
        assert!(page.contains("value=\"5.8\""));
    }

    #[test]
    fn backend_status_messages() {
        let mut s = state(InputMode::Manual);
        s.backend = BackendStatus::Unhealthy(503);
        assert!(render_page(&s).into_string().contains("Backend returned status code 503. 😭"));

        s.backend = BackendStatus::Offline("refused".into());
        assert!(render_page(&s).into_string().contains("Backend offline 😱"));
    }

    #[test]
    fn predicted_class_is_shown() {
        let mut s = state(InputMode::Manual);
        s.result = ResultView::Predicted(&IRIS_CLASSES[1]);
        let page = render_page(&s).into_string();
        assert!(page.contains("Versicolor"));
        assert!(page.contains("/assets/versicolor.svg"));
    }

    #[test]
    fn failure_shows_toast() {
        let mut s = state(InputMode::Manual);
        s.result = ResultView::Failed;
        let page = render_page(&s).into_string();
        assert!(page.contains("Failed to get a prediction from the backend."));
        assert!(page.contains("Problem connecting to the backend"));
    }

    #[test]
    fn offline_backend_disables_predict() {
        let mut s = state(InputMode::Manual);
        assert!(s.can_predict());
        s.backend = BackendStatus::Offline("connection refused".into());
        assert!(!s.can_predict());
        assert!(render_page(&s).into_string().contains("disabled"));
    }

    #[test]
    fn upload_mode_without_file_disables_predict() {
        let s = state(InputMode::Upload);
        assert!(!s.can_predict());
        let page = render_page(&s).into_string();
        assert!(page.contains("disabled"));
    }

    #[test]
    fn upload_missing_key_warns_and_disables_predict() {
        let mut s = state(InputMode::Upload);
        s.upload = Some(parse_upload(br#"{"features": {}}"#, 1024));
        assert!(!s.can_predict());
        let page = render_page(&s).into_string();
        assert!(page.contains("must contain an"));
        assert!(page.contains("disabled"));
        assert!(!page.contains("name=\"payload\""));
    }

    #[test]
    fn valid_upload_enables_predict() {
        let mut s = state(InputMode::Upload);
        s.upload = Some(parse_upload(br#"{"input_test": {"sepal_length": 5.1}}"#, 1024));
        assert!(s.can_predict());
        let page = render_page(&s).into_string();
        assert!(page.contains("name=\"payload\""));
        assert!(page.contains("name=\"preview\""));
        assert!(!page.contains("disabled"));
    }
}
