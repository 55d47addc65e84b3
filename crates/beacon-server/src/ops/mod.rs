//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness
//! - `/ready`   : readiness (no dependency checks yet)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::app_state::AppState;

pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub timestamp: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn health() -> impl IntoResponse {
    Json(ProbeResponse { status: "healthy", timestamp: now_rfc3339() })
}

pub async fn ready() -> impl IntoResponse {
    Json(ProbeResponse { status: "ready", timestamp: now_rfc3339() })
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics().export() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
