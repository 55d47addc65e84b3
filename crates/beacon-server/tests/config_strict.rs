#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use beacon_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  prot: 8080 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.listen_addr(), "0.0.0.0:3000");
    assert_eq!(cfg.app.name, "beacon");
    assert_eq!(cfg.metrics.duration_buckets.len(), 9);
    assert!(cfg.metrics.process_metrics);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
server:
  host: "127.0.0.1"
  port: 8081
app:
  name: "probe-demo"
  features: ["a", "b"]
metrics:
  duration_buckets: [0.005, 0.05, 0.5, 5]
  process_metrics: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8081");
    assert_eq!(cfg.app.features, vec!["a", "b"]);
    assert_eq!(cfg.metrics.duration_buckets, vec![0.005, 0.05, 0.5, 5.0]);
    assert!(!cfg.metrics.process_metrics);
}

#[test]
fn rejects_unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "CONFIG");
}

#[test]
fn rejects_unordered_buckets() {
    let bad = r#"
version: 1
metrics:
  duration_buckets: [0.5, 0.1]
"#;
    assert!(config::load_from_str(bad).is_err());

    let empty = r#"
version: 1
metrics:
  duration_buckets: []
"#;
    assert!(config::load_from_str(empty).is_err());
}

#[test]
fn port_env_override() {
    let mut cfg = config::BeaconConfig::default();
    config::apply_port_override(&mut cfg, Some("9100")).unwrap();
    assert_eq!(cfg.server.port, 9100);

    config::apply_port_override(&mut cfg, None).unwrap();
    assert_eq!(cfg.server.port, 9100);

    assert!(config::apply_port_override(&mut cfg, Some("http")).is_err());
    assert!(config::apply_port_override(&mut cfg, Some("0")).is_err());
}
