//! Vibration Monitor: real-time vibration analysis over WebSocket
//!
//! Sensor clients push batches of raw samples; each batch is reduced to an
//! RMS amplitude and a dominant frequency, returned to the sending client
//! and appended to a bounded rolling history.
//!
//! ## Architecture
//!
//! - **Acquisition**: JSON decoding and validation of sensor batches
//! - **Processing**: RMS and FFT-based dominant frequency
//! - **Storage**: Bounded FIFO history with snapshot reads
//! - **Pipeline**: Connection roster, per-client workers, result publishing
//! - **Presentation**: Trend series built from history snapshots
//! - **API**: WebSocket ingestion plus read-only HTTP endpoints

pub mod acquisition;
pub mod api;
pub mod config;
pub mod pipeline;
pub mod presentation;
pub mod processing;
pub mod service;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, ServiceConfig};

// Re-export commonly used types
pub use types::{AnalysisRequest, AnalysisResponse, AnalysisResult, ErrorResponse, HistoryEntry};

// Re-export pipeline components
pub use pipeline::{ClientId, ConnectionManager, InboundFrame, PipelineError, PipelineErrorKind, Reply, ResultPublisher};

// Re-export storage
pub use storage::{HistorySnapshot, HistoryStats, HistoryStore, StorageError};

pub use service::VibrationService;
