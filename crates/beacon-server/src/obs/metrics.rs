//! Metrics registry for the HTTP service.
//!
//! Counter and histogram families with label names fixed at registration,
//! entries created lazily per label combination and backed by `DashMap`.
//! Values are atomics so concurrent observations never lose updates.
//! Rendering sorts entries by label values so the exposition is deterministic.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use beacon_core::error::{BeaconError, Result};

use super::process;

/// Request duration buckets in seconds.
pub const DEFAULT_DURATION_BUCKETS: [f64; 9] = [0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0, 7.0, 10.0];

/// Label dimensions shared by all HTTP series.
pub const HTTP_LABELS: [&str; 3] = ["method", "route", "status_code"];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_pairs(names: &[&'static str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn fmt_err(name: &str) -> impl Fn(std::fmt::Error) -> BeaconError + '_ {
    move |_| BeaconError::Internal(format!("failed to encode metric {name}"))
}

fn check_arity(name: &str, names: &[&'static str], values: &[&str]) -> Result<()> {
    if names.len() != values.len() {
        return Err(BeaconError::BadRequest(format!(
            "metric {name} expects {} label values, got {}",
            names.len(),
            values.len()
        )));
    }
    Ok(())
}

pub struct CounterVec {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self { name, help, labels, map: DashMap::new() }
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) -> Result<()> {
        check_arity(self.name, self.labels, values)?;
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value, `None` if the combination was never observed.
    pub fn get(&self, values: &[&str]) -> Option<u64> {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|c| c.load(Ordering::Relaxed))
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, out: &mut String) -> Result<()> {
        let name = self.name;
        writeln!(out, "# HELP {} {}", name, self.help).map_err(fmt_err(name))?;
        writeln!(out, "# TYPE {} counter", name).map_err(fmt_err(name))?;

        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, val) in rows {
            writeln!(out, "{}{{{}}} {}", name, label_pairs(self.labels, &key), val)
                .map_err(fmt_err(name))?;
        }
        Ok(())
    }
}

/// Per-combination histogram state.
///
/// `slots[i]` counts observations that fall in `(bounds[i-1], bounds[i]]`;
/// the trailing slot holds observations above the last bound. Cumulative
/// bucket values are summed at render time, so a snapshot is always
/// non-decreasing in `le` even while observers are running.
struct AtomicHistogram {
    slots: Vec<AtomicU64>,
    sum_bits: AtomicU64,
}

impl AtomicHistogram {
    fn new(bounds: usize) -> Self {
        Self {
            slots: (0..=bounds).map(|_| AtomicU64::new(0)).collect(),
            sum_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    fn add_sum(&self, v: f64) {
        let mut cur = self.sum_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + v).to_bits();
            match self
                .sum_bits
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    fn sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }
}

/// Snapshot of one histogram entry: cumulative bucket counts, sum, count.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

pub struct HistogramVec {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    /// Bounds must be finite and strictly increasing; they are fixed for the
    /// lifetime of the family.
    pub fn new(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
        bounds: &[f64],
    ) -> Result<Self> {
        if bounds.is_empty() {
            return Err(BeaconError::Config(format!("histogram {name} needs at least one bucket")));
        }
        if bounds.iter().any(|b| !b.is_finite()) || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BeaconError::Config(format!(
                "histogram {name} buckets must be finite and strictly increasing"
            )));
        }
        Ok(Self { name, help, labels, bounds: bounds.to_vec(), map: DashMap::new() })
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Observe a value in seconds.
    pub fn observe(&self, values: &[&str], v: f64) -> Result<()> {
        check_arity(self.name, self.labels, values)?;
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let bounds = self.bounds.len();
        let hist = self.map.entry(key).or_insert_with(|| AtomicHistogram::new(bounds));

        // first bucket whose upper bound >= v
        let idx = self.bounds.partition_point(|b| *b < v);
        hist.slots[idx].fetch_add(1, Ordering::Relaxed);
        hist.add_sum(v);
        Ok(())
    }

    pub fn snapshot(&self, values: &[&str]) -> Option<HistogramSnapshot> {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|h| self.snapshot_of(&h))
    }

    fn snapshot_of(&self, hist: &AtomicHistogram) -> HistogramSnapshot {
        let mut acc = 0u64;
        let mut buckets = Vec::with_capacity(self.bounds.len());
        for (i, le) in self.bounds.iter().enumerate() {
            acc += hist.slots[i].load(Ordering::Relaxed);
            buckets.push((*le, acc));
        }
        acc += hist.slots[self.bounds.len()].load(Ordering::Relaxed);
        HistogramSnapshot { buckets, sum: hist.sum(), count: acc }
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, out: &mut String) -> Result<()> {
        let name = self.name;
        writeln!(out, "# HELP {} {}", name, self.help).map_err(fmt_err(name))?;
        writeln!(out, "# TYPE {} histogram", name).map_err(fmt_err(name))?;

        let mut rows: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), self.snapshot_of(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, snap) in rows {
            let label_str = label_pairs(self.labels, &key);
            let prefix = if label_str.is_empty() { String::new() } else { format!("{},", label_str) };

            for (le, count) in &snap.buckets {
                writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count)
                    .map_err(fmt_err(name))?;
            }
            writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count)
                .map_err(fmt_err(name))?;
            writeln!(out, "{}_sum{{{}}} {}", name, label_str, snap.sum).map_err(fmt_err(name))?;
            writeln!(out, "{}_count{{{}}} {}", name, label_str, snap.count).map_err(fmt_err(name))?;
        }
        Ok(())
    }
}

/// The service's registered series plus process metrics.
pub struct HttpMetrics {
    pub request_duration: HistogramVec,
    pub requests_total: CounterVec,
    pub errors_total: CounterVec,
    process: Option<process::ProcessCollector>,
}

impl HttpMetrics {
    pub fn new(duration_buckets: &[f64], process_metrics: bool) -> Result<Self> {
        Ok(Self {
            request_duration: HistogramVec::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
                &HTTP_LABELS,
                duration_buckets,
            )?,
            requests_total: CounterVec::new(
                "http_requests_total",
                "Total number of HTTP requests",
                &HTTP_LABELS,
            ),
            errors_total: CounterVec::new(
                "http_errors_total",
                "Total number of HTTP errors",
                &HTTP_LABELS,
            ),
            process: process_metrics.then(process::ProcessCollector::new),
        })
    }

    /// Begin timing a request. Dropping the returned guard without calling
    /// [`InFlight::finish`] records nothing.
    pub fn start<'a>(&'a self, method: &str, route: &str) -> InFlight<'a> {
        InFlight {
            metrics: self,
            method: method.to_string(),
            route: route.to_string(),
            started: Instant::now(),
        }
    }

    /// Record a completed request.
    pub fn observe(&self, method: &str, route: &str, status: u16, seconds: f64) -> Result<()> {
        let code = status.to_string();
        let labels = [method, route, code.as_str()];
        self.request_duration.observe(&labels, seconds)?;
        self.requests_total.inc(&labels)?;
        if status >= 500 {
            self.errors_total.inc(&labels)?;
        }
        Ok(())
    }

    /// Render every series and the process metrics.
    pub fn export(&self) -> Result<String> {
        let mut out = String::new();
        self.request_duration.render(&mut out)?;
        self.requests_total.render(&mut out)?;
        self.errors_total.render(&mut out)?;
        if let Some(p) = &self.process {
            p.render(&mut out)?;
        }
        Ok(out)
    }
}

/// Timing state for one in-flight request.
pub struct InFlight<'a> {
    metrics: &'a HttpMetrics,
    method: String,
    route: String,
    started: Instant,
}

impl InFlight<'_> {
    pub fn finish(self, status: u16) -> Result<()> {
        let seconds = self.started.elapsed().as_secs_f64();
        self.metrics.observe(&self.method, &self.route, status, seconds)
    }
}
