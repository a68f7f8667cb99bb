//! Config Validation Tests
//!
//! Loads TOML files from a temp directory and checks parsing, defaults,
//! unknown-key rejection and cross-field validation.

use std::io::Write;

use vibration_monitor::config::{defaults, ConfigError, ServiceConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn full_config_loads() {
    let file = write_config(
        r#"
[server]
host = "127.0.0.1"
port = 9100

[history]
capacity = 250

[connections]
inbound_queue_depth = 8
outbound_queue_depth = 16

[presentation]
trend_report_interval_secs = 30
"#,
    );

    let config = ServiceConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.history.capacity, 250);
    assert_eq!(config.connections.inbound_queue_depth, 8);
    assert_eq!(config.connections.outbound_queue_depth, 16);
    assert_eq!(config.presentation.trend_report_interval_secs, 30);
    assert_eq!(config.listen_addr().unwrap().port(), 9100);
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let config = ServiceConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config, ServiceConfig::default());
    assert_eq!(config.history.capacity, defaults::HISTORY_CAPACITY);
    assert_eq!(config.server.port, defaults::DEFAULT_PORT);
}

#[test]
fn partial_section_fills_remaining_defaults() {
    let file = write_config(
        r#"
[server]
port = 7000
"#,
    );
    let config = ServiceConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.server.host, defaults::DEFAULT_HOST);
    assert_eq!(config.history.capacity, defaults::HISTORY_CAPACITY);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServiceConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn typo_in_key_is_rejected() {
    let file = write_config(
        r#"
[history]
capactiy = 50
"#,
    );
    let err = ServiceConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
    assert!(err.to_string().contains("capactiy"));
}

#[test]
fn unknown_section_is_rejected() {
    let file = write_config(
        r#"
[database]
url = "sqlite://x"
"#,
    );
    assert!(matches!(
        ServiceConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn wrong_type_is_rejected() {
    let file = write_config(
        r#"
[server]
port = "eight thousand"
"#,
    );
    assert!(ServiceConfig::load_from_file(file.path()).is_err());
}

#[test]
fn zero_values_report_every_problem() {
    let file = write_config(
        r#"
[history]
capacity = 0

[connections]
inbound_queue_depth = 0
outbound_queue_depth = 0
"#,
    );
    match ServiceConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3, "{errors:?}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unresolvable_host_is_rejected_at_load() {
    let file = write_config(
        r#"
[server]
host = "not a host"
"#,
    );
    match ServiceConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("not a host")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn hostname_and_bare_ipv6_hosts_load() {
    for host in ["localhost", "::1"] {
        let file = write_config(&format!("[server]\nhost = \"{host}\"\nport = 9100\n"));
        let config = ServiceConfig::load_from_file(file.path()).unwrap();
        let addr = config.listen_addr().unwrap();
        assert!(addr.ip().is_loopback(), "{host} -> {addr}");
        assert_eq!(addr.port(), 9100);
    }
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn printed_config_loads_back() {
    let mut config = ServiceConfig::default();
    config.history.capacity = 42;
    config.server.port = 9999;

    let file = write_config(&config.to_toml().unwrap());
    assert_eq!(ServiceConfig::load_from_file(file.path()).unwrap(), config);
}
