//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default listen host (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port for the WebSocket endpoint and HTTP API.
pub const DEFAULT_PORT: u16 = 8765;

// ============================================================================
// History
// ============================================================================

/// Number of analysis results retained for trend display.
pub const HISTORY_CAPACITY: usize = 100;

// ============================================================================
// Connections
// ============================================================================

/// Messages buffered per client between the socket reader and its worker.
pub const INBOUND_QUEUE_DEPTH: usize = 32;

/// Replies buffered per client before new replies are dropped.
pub const OUTBOUND_QUEUE_DEPTH: usize = 64;

// ============================================================================
// Presentation
// ============================================================================

/// Interval between trend summaries in the log (seconds). 0 disables.
pub const TREND_REPORT_INTERVAL_SECS: u64 = 0;

// ============================================================================
// Config Search
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "VIBRATION_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "vibration.toml";
