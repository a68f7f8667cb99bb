//! Service Configuration Module
//!
//! Startup-only configuration loaded from TOML. There is no runtime
//! reconfiguration: the loaded value is handed to `VibrationService::new`.
//!
//! ## Loading Order
//!
//! 1. `VIBRATION_CONFIG` environment variable (path to TOML file)
//! 2. `vibration.toml` in the current working directory
//! 3. Built-in defaults
//!
//! CLI flags are applied on top of whichever source won.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8765
//!
//! [history]
//! capacity = 100
//! ```

pub mod defaults;
mod service_config;

pub use service_config::*;
