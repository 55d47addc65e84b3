//! Request instrumentation middleware.
//!
//! Wraps the downstream handler: starts a timer with the route template,
//! runs the request, then records duration, count and errors under
//! `{method, route, status_code}`.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use super::metrics::HttpMetrics;

/// Route label for a request: the matched pattern, or the raw path when no
/// route matched (e.g. 404).
pub fn route_template(req: &Request) -> String {
    match req.extensions().get::<MatchedPath>() {
        Some(p) => p.as_str().to_string(),
        None => req.uri().path().to_string(),
    }
}

pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = route_template(&req);

    // dropped without finish if the connection goes away mid-request
    let inflight = metrics.start(&method, &route);
    let resp = next.run(req).await;

    let status = resp.status().as_u16();
    if let Err(e) = inflight.finish(status) {
        tracing::warn!(%method, %route, status, error = %e, "request metrics not recorded");
    }
    resp
}
