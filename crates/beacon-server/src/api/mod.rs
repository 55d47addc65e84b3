//! Application endpoints.

use axum::{extract::State, http::Uri, response::IntoResponse, Json};
use serde::Serialize;

use beacon_core::error::BeaconError;

use crate::app_state::AppState;
use crate::error::HttpError;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub app: String,
    pub version: &'static str,
    pub features: Vec<String>,
    pub uptime_seconds: f64,
}

pub async fn root() -> &'static str {
    "Hello from beacon!"
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let app = &state.cfg().app;
    Json(StatusResponse {
        app: app.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        features: app.features.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Always fails; lets operators check that `http_errors_total` moves.
pub async fn error_test() -> HttpError {
    tracing::warn!("error-test endpoint hit");
    BeaconError::Internal("intentional error for metrics testing".into()).into()
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    HttpError(BeaconError::NotFound(uri.path().to_string()))
}
