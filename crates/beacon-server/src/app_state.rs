//! Shared application state.
//!
//! Owns the config and the metrics registry. Built once at startup and
//! cloned into handlers; tests build their own isolated instance.

use std::sync::Arc;
use std::time::Instant;

use beacon_core::error::Result;

use crate::config::BeaconConfig;
use crate::obs::metrics::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<HttpMetrics>,
}

struct AppStateInner {
    cfg: BeaconConfig,
    started: Instant,
}

impl AppState {
    /// Build application state and register the metric series.
    pub fn new(cfg: BeaconConfig) -> Result<Self> {
        let metrics = HttpMetrics::new(&cfg.metrics.duration_buckets, cfg.metrics.process_metrics)?;
        tracing::debug!(
            buckets = ?cfg.metrics.duration_buckets,
            process_metrics = cfg.metrics.process_metrics,
            "metrics registered"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, started: Instant::now() }),
            metrics: Arc::new(metrics),
        })
    }

    pub fn cfg(&self) -> &BeaconConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.inner.started.elapsed().as_secs_f64()
    }
}
