//! Sensor data acquisition module
//!
//! Turns raw client payloads into validated analysis requests.

pub mod decoder;

pub use decoder::decode;
