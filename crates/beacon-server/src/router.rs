//! Axum router wiring.
//!
//! Middleware is applied as an explicit ordered list: request tracing
//! outermost, then metrics tracking around every handler (fallback included).

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{api, app_state::AppState, obs::track, ops};

pub fn build_router(state: AppState) -> Router {
    let metrics = state.metrics();

    Router::new()
        .route("/health", get(ops::health))
        .route("/ready", get(ops::ready))
        .route("/metrics", get(ops::metrics))
        .route("/", get(api::root))
        .route("/api/status", get(api::status))
        .route("/api/error-test", get(api::error_test))
        .fallback(api::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(metrics, track::track_metrics)),
        )
        .with_state(state)
}
