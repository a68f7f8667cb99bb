//! Service Configuration - listen address, history size and queue depths
//!
//! Every field has a default, so an empty or missing file yields a working
//! service on `0.0.0.0:8765` with a 100-entry history.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration, fixed for the lifetime of the process.
///
/// Load with `ServiceConfig::load()` which searches:
/// 1. `$VIBRATION_CONFIG` env var
/// 2. `./vibration.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default)]
    pub server: ServerConfig,

    /// Rolling result history
    #[serde(default)]
    pub history: HistoryConfig,

    /// Per-client queue sizing
    #[serde(default)]
    pub connections: ConnectionsConfig,

    /// Trend reporting
    #[serde(default)]
    pub presentation: PresentationConfig,
}

impl ServiceConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when a file is missing or invalid.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load and validate a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints. All problems are reported together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        } else if let Err(e) = self.listen_addr() {
            errors.push(e.to_string());
        }
        if self.history.capacity == 0 {
            errors.push("history.capacity must be at least 1".to_string());
        }
        if self.connections.inbound_queue_depth == 0 {
            errors.push("connections.inbound_queue_depth must be at least 1".to_string());
        }
        if self.connections.outbound_queue_depth == 0 {
            errors.push("connections.outbound_queue_depth must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Resolve `host:port` into a socket address.
    ///
    /// Accepts IP literals (IPv6 without brackets) and hostnames; a name that
    /// resolves to several addresses binds the first.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.server.host.trim();
        let unresolved = |reason: String| {
            ConfigError::Validation(vec![format!(
                "cannot resolve listen host '{host}' (port {}): {reason}",
                self.server.port
            )])
        };

        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| unresolved(e.to_string()))?
            .next()
            .ok_or_else(|| unresolved("no addresses found".to_string()))
    }

    /// Serialize to pretty TOML (used by `--print-config`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen host. Can be overridden by `--host` / `VIBRATION_HOST`.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port. Can be overridden by `--port` / `VIBRATION_PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    defaults::DEFAULT_HOST.to_string()
}

const fn default_port() -> u16 {
    defaults::DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum retained results; oldest are evicted first.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

const fn default_capacity() -> usize {
    defaults::HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionsConfig {
    #[serde(default = "default_inbound_depth")]
    pub inbound_queue_depth: usize,

    #[serde(default = "default_outbound_depth")]
    pub outbound_queue_depth: usize,
}

const fn default_inbound_depth() -> usize {
    defaults::INBOUND_QUEUE_DEPTH
}

const fn default_outbound_depth() -> usize {
    defaults::OUTBOUND_QUEUE_DEPTH
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            inbound_queue_depth: default_inbound_depth(),
            outbound_queue_depth: default_outbound_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresentationConfig {
    /// Seconds between logged trend summaries; 0 disables the reporter.
    #[serde(default = "default_report_interval")]
    pub trend_report_interval_secs: u64,
}

const fn default_report_interval() -> u64 {
    defaults::TREND_REPORT_INTERVAL_SECS
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            trend_report_interval_secs: default_report_interval(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.history.capacity, 100);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: ServiceConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.history.capacity, 100);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.history.capacity = 0;
        config.connections.inbound_queue_depth = 0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_listen_addr() {
        let mut config = ServiceConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:0");

        config.server.host = "not a host".to_string();
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn test_listen_addr_accepts_hostname_and_bare_ipv6() {
        let mut config = ServiceConfig::default();
        config.server.port = 8765;

        config.server.host = "localhost".to_string();
        let addr = config.listen_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8765);
        assert!(config.validate().is_ok());

        config.server.host = "::1".to_string();
        let addr = config.listen_addr().unwrap();
        assert_eq!(addr.to_string(), "[::1]:8765");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unresolvable_host_fails_validation() {
        let mut config = ServiceConfig::default();
        config.server.host = "not a host".to_string();

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("not a host"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ServiceConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: ServiceConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
