//! Process metrics sampled at export time.
//!
//! Start time and uptime are available everywhere. Memory and descriptor
//! counts are read from `/proc/self` and silently omitted when unavailable.

use std::fmt::Write;
use std::fs;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use beacon_core::error::{BeaconError, Result};

pub struct ProcessCollector {
    start_unix_secs: f64,
    started: Instant,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    pub fn new() -> Self {
        let start_unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        Self { start_unix_secs, started: Instant::now() }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub(crate) fn render(&self, out: &mut String) -> Result<()> {
        gauge(out, "process_start_time_seconds", "Start time of the process since unix epoch in seconds", self.start_unix_secs.floor())?;
        gauge(out, "process_uptime_seconds", "Seconds since the process started", self.uptime_seconds())?;

        if let Some(status) = read_proc("status") {
            if let Some(rss) = status_kib(&status, "VmRSS:") {
                gauge(out, "process_resident_memory_bytes", "Resident memory size in bytes", (rss * 1024) as f64)?;
            }
            if let Some(vsz) = status_kib(&status, "VmSize:") {
                gauge(out, "process_virtual_memory_bytes", "Virtual memory size in bytes", (vsz * 1024) as f64)?;
            }
        }
        if let Ok(dir) = fs::read_dir("/proc/self/fd") {
            gauge(out, "process_open_fds", "Number of open file descriptors", dir.count() as f64)?;
        }
        Ok(())
    }
}

fn gauge(out: &mut String, name: &str, help: &str, v: f64) -> Result<()> {
    writeln!(out, "# HELP {} {}\n# TYPE {} gauge\n{} {}", name, help, name, name, v)
        .map_err(|_| BeaconError::Internal(format!("failed to encode metric {name}")))
}

fn read_proc(file: &str) -> Option<String> {
    fs::read_to_string(format!("/proc/self/{file}")).ok()
}

/// Parse a `Key:   1234 kB` line from `/proc/self/status`.
fn status_kib(status: &str, key: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|l| l.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}
