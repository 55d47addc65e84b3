//! Service config loader (strict parsing, env override for the port).

pub mod schema;

use std::fs;
use std::path::Path;

use beacon_core::error::{BeaconError, Result};

pub use schema::{AppSection, BeaconConfig, MetricsSection, ServerSection};

/// Config file read when `BEACON_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "beacon.yaml";

pub fn load_from_file(path: &str) -> Result<BeaconConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BeaconError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BeaconConfig> {
    let cfg: BeaconConfig = serde_yaml::from_str(s)
        .map_err(|e| BeaconError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply the `PORT` override.
pub fn apply_port_override(cfg: &mut BeaconConfig, port: Option<&str>) -> Result<()> {
    if let Some(raw) = port {
        let port: u16 = raw
            .trim()
            .parse()
            .map_err(|_| BeaconError::Config(format!("PORT is not a valid port: {raw}")))?;
        cfg.server.port = port;
        cfg.server.validate()?;
    }
    Ok(())
}

/// Load the file named by `BEACON_CONFIG` (or `beacon.yaml` when present),
/// falling back to defaults, then apply `PORT`.
pub fn load() -> Result<BeaconConfig> {
    let explicit = std::env::var("BEACON_CONFIG").ok();
    let mut cfg = match explicit.as_deref() {
        Some(path) => {
            tracing::info!(path, "loading config");
            load_from_file(path)?
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "loading config");
            load_from_file(DEFAULT_CONFIG_PATH)?
        }
        None => {
            tracing::info!("no config file, using defaults");
            BeaconConfig::default()
        }
    };
    apply_port_override(&mut cfg, std::env::var("PORT").ok().as_deref())?;
    Ok(cfg)
}
