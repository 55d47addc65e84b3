#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use beacon_server::obs::metrics::{HistogramVec, HttpMetrics, DEFAULT_DURATION_BUCKETS, HTTP_LABELS};

fn registry() -> HttpMetrics {
    HttpMetrics::new(&DEFAULT_DURATION_BUCKETS, false).unwrap()
}

#[test]
fn counts_per_label_combination() {
    let m = registry();
    for _ in 0..5 {
        m.observe("GET", "/api/status", 200, 0.01).unwrap();
    }
    m.observe("POST", "/api/status", 200, 0.01).unwrap();

    assert_eq!(m.requests_total.get(&["GET", "/api/status", "200"]), Some(5));
    assert_eq!(m.requests_total.get(&["POST", "/api/status", "200"]), Some(1));
    assert_eq!(m.errors_total.get(&["GET", "/api/status", "200"]), None);
}

#[test]
fn errors_only_for_5xx() {
    let m = registry();
    m.observe("GET", "/x", 404, 0.0).unwrap();
    m.observe("GET", "/x", 499, 0.0).unwrap();
    m.observe("GET", "/x", 500, 0.0).unwrap();
    m.observe("GET", "/x", 503, 0.0).unwrap();

    assert_eq!(m.errors_total.get(&["GET", "/x", "404"]), None);
    assert_eq!(m.errors_total.get(&["GET", "/x", "499"]), None);
    assert_eq!(m.errors_total.get(&["GET", "/x", "500"]), Some(1));
    assert_eq!(m.errors_total.get(&["GET", "/x", "503"]), Some(1));
}

#[test]
fn histogram_is_cumulative() {
    let m = registry();
    for d in [0.05, 0.1, 0.2, 0.9, 2.0, 6.0, 42.0] {
        m.observe("GET", "/", 200, d).unwrap();
    }
    let snap = m.request_duration.snapshot(&["GET", "/", "200"]).unwrap();

    let counts: Vec<u64> = snap.buckets.iter().map(|(_, c)| *c).collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    // 0.05 and 0.1 (bound inclusive) land in le=0.1
    assert_eq!(snap.buckets[0], (0.1, 2));
    assert_eq!(snap.buckets[4], (1.0, 4));
    assert_eq!(snap.buckets[8], (10.0, 6));
    assert_eq!(snap.count, 7);
    assert!((snap.sum - 51.25).abs() < 1e-9);
}

#[test]
fn bucket_bounds_must_increase() {
    assert!(HistogramVec::new("h", "h", &HTTP_LABELS, &[]).is_err());
    assert!(HistogramVec::new("h", "h", &HTTP_LABELS, &[1.0, 1.0]).is_err());
    assert!(HistogramVec::new("h", "h", &HTTP_LABELS, &[1.0, f64::INFINITY]).is_err());
    let h = HistogramVec::new("h", "h", &HTTP_LABELS, &[0.5, 1.0]).unwrap();
    assert_eq!(h.bounds(), &[0.5, 1.0]);
}

#[test]
fn wrong_label_arity_is_rejected() {
    let m = registry();
    assert!(m.requests_total.inc(&["GET", "/"]).is_err());
    assert!(m.request_duration.observe(&["GET"], 0.1).is_err());
}

#[test]
fn dropped_inflight_records_nothing() {
    let m = registry();
    {
        let _aborted = m.start("GET", "/slow");
    }
    m.start("GET", "/fast").finish(200).unwrap();

    let out = m.export().unwrap();
    assert!(!out.contains("/slow"));
    assert!(out.contains("http_requests_total{method=\"GET\",route=\"/fast\",status_code=\"200\"} 1"));
}

#[test]
fn concurrent_increments_are_not_lost() {
    let m = Arc::new(registry());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for _ in 0..1000 {
                    m.observe("GET", "/hot", 200, 0.001).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(m.requests_total.get(&["GET", "/hot", "200"]), Some(8000));
    let snap = m.request_duration.snapshot(&["GET", "/hot", "200"]).unwrap();
    assert_eq!(snap.count, 8000);
    assert!((snap.sum - 8.0).abs() < 1e-6);
}

#[test]
fn export_format_and_order() {
    let m = HttpMetrics::new(&[0.5, 1.0], false).unwrap();
    m.observe("GET", "/b", 200, 0.25).unwrap();
    m.observe("GET", "/a", 500, 0.75).unwrap();

    let out = m.export().unwrap();
    let expected = "\
# HELP http_request_duration_seconds Duration of HTTP requests in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{method=\"GET\",route=\"/a\",status_code=\"500\",le=\"0.5\"} 0
http_request_duration_seconds_bucket{method=\"GET\",route=\"/a\",status_code=\"500\",le=\"1\"} 1
http_request_duration_seconds_bucket{method=\"GET\",route=\"/a\",status_code=\"500\",le=\"+Inf\"} 1
http_request_duration_seconds_sum{method=\"GET\",route=\"/a\",status_code=\"500\"} 0.75
http_request_duration_seconds_count{method=\"GET\",route=\"/a\",status_code=\"500\"} 1
http_request_duration_seconds_bucket{method=\"GET\",route=\"/b\",status_code=\"200\",le=\"0.5\"} 1
http_request_duration_seconds_bucket{method=\"GET\",route=\"/b\",status_code=\"200\",le=\"1\"} 1
http_request_duration_seconds_bucket{method=\"GET\",route=\"/b\",status_code=\"200\",le=\"+Inf\"} 1
http_request_duration_seconds_sum{method=\"GET\",route=\"/b\",status_code=\"200\"} 0.25
http_request_duration_seconds_count{method=\"GET\",route=\"/b\",status_code=\"200\"} 1
# HELP http_requests_total Total number of HTTP requests
# TYPE http_requests_total counter
http_requests_total{method=\"GET\",route=\"/a\",status_code=\"500\"} 1
http_requests_total{method=\"GET\",route=\"/b\",status_code=\"200\"} 1
# HELP http_errors_total Total number of HTTP errors
# TYPE http_errors_total counter
http_errors_total{method=\"GET\",route=\"/a\",status_code=\"500\"} 1
";
    assert_eq!(out, expected);
    // same state, same bytes
    assert_eq!(m.export().unwrap(), out);
}

#[test]
fn label_values_are_escaped() {
    let m = registry();
    m.observe("GET", "/q\"x\\y\nz", 404, 0.0).unwrap();
    let out = m.export().unwrap();
    assert!(out.contains(r#"route="/q\"x\\y\nz""#));
}

#[test]
fn process_metrics_are_merged() {
    let m = HttpMetrics::new(&DEFAULT_DURATION_BUCKETS, true).unwrap();
    let out = m.export().unwrap();
    assert!(out.contains("# TYPE process_start_time_seconds gauge"));
    assert!(out.contains("# TYPE process_uptime_seconds gauge"));
    assert!(out.contains("# TYPE http_requests_total counter"));
}
