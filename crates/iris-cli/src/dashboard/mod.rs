//! Browser dashboard for the prediction service.
//!
//! Pages are rendered on the server; no state survives between requests
//! beyond what the forms post back.
pub mod handlers;
pub mod inputs;
pub mod view;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::config::DashboardConfig;

/// Headroom over the file limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<DashboardConfig>,
}

pub fn router(config: DashboardConfig) -> Router {
    let body_limit = config.max_upload_bytes + MULTIPART_OVERHEAD;
    let state = DashboardState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict_form))
        .route("/upload", post(handlers::upload))
        .route("/assets/:file", get(handlers::asset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn serve(config: DashboardConfig) -> Result<()> {
    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    serve_on(listener, config).await
}

pub async fn serve_on(listener: TcpListener, config: DashboardConfig) -> Result<()> {
    if !config.assets_dir.is_dir() {
        log::warn!(
            "Assets directory {} not found; species illustrations will be missing",
            config.assets_dir.display()
        );
    }
    log::info!(
        "Dashboard listening on http://{} (backend {})",
        listener.local_addr()?,
        config.backend_url
    );
    axum::serve(listener, router(config))
        .await
        .context("Dashboard stopped unexpectedly")?;
    Ok(())
}
