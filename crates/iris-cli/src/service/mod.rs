//! Prediction service: `POST /predict` and `GET /health` over a lazily loaded
//! model bundle.
pub mod api;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use iris_classifiers::Predictor;

use crate::config::ServiceConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict))
        .with_state(state)
}

/// Bind `config.address()` and serve until the process is stopped.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    serve_on(listener, config).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, config: ServiceConfig) -> Result<()> {
    let state = AppState::new(Predictor::new(config.model.clone()));

    if config.preload {
        let predictor = Arc::clone(&state.predictor);
        tokio::task::spawn_blocking(move || predictor.bundle().map(|_| ()))
            .await
            .context("Model preload task failed")?
            .context("Failed to load model at startup")?;
        log::info!("Model loaded from {}", config.model.model_path.display());
    }

    let local = listener.local_addr()?;
    log::info!("Prediction service listening on http://{}", local);
    axum::serve(listener, router(state))
        .await
        .context("Prediction service stopped unexpectedly")?;
    Ok(())
}
