//! Result storage
//!
//! Holds the rolling analysis history shared by ingestion and presentation.

pub mod history;

pub use history::{HistorySnapshot, HistoryStats, HistoryStore};

use thiserror::Error;

/// Errors in storage construction
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("History capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
}
