use serde::Deserialize;
use beacon_core::error::{BeaconError, Result};

use crate::obs::metrics::DEFAULT_DURATION_BUCKETS;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            app: AppSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl BeaconConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BeaconError::Config(format!("unsupported config version: {}", self.version)));
        }
        self.server.validate()?;
        self.app.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(BeaconError::Config("server.port must be non-zero".into()));
        }
        if self.host.trim().is_empty() {
            return Err(BeaconError::Config("server.host must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_features")]
    pub features: Vec<String>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self { name: default_app_name(), features: default_features() }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BeaconError::Config("app.name must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    #[serde(default = "default_true")]
    pub process_metrics: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { duration_buckets: default_duration_buckets(), process_metrics: true }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        let b = &self.duration_buckets;
        if b.is_empty() {
            return Err(BeaconError::Config("metrics.duration_buckets must not be empty".into()));
        }
        if b.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(BeaconError::Config(
                "metrics.duration_buckets must be finite and positive".into(),
            ));
        }
        if b.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BeaconError::Config(
                "metrics.duration_buckets must be strictly increasing".into(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_app_name() -> String {
    "beacon".into()
}
fn default_features() -> Vec<String> {
    vec!["health-checks".into(), "metrics".into(), "error-tracking".into()]
}
fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_DURATION_BUCKETS.to_vec()
}
fn default_true() -> bool {
    true
}
