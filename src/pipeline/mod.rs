//! Ingestion pipeline
//!
//! - [`ConnectionManager`]: client roster and message dispatch
//! - [`ResultPublisher`]: reply routing back to the originating client
//! - [`PipelineError`]: tagged per-message / per-connection failures

pub mod connections;
mod error;
pub mod publisher;

pub use connections::{ClientId, ClientInfo, ConnectionManager, ConnectionStats, InboundFrame};
pub use error::{PipelineError, PipelineErrorKind};
pub use publisher::{Reply, ResultPublisher};
