//! Shared data structures for the vibration analysis pipeline
//!
//! - Ingestion: [`AnalysisRequest`] (validated sample batch)
//! - Analysis: [`AnalysisResult`] (RMS + dominant frequency)
//! - History: [`HistoryEntry`] (timestamped result held by the history store)
//! - Wire: [`AnalysisResponse`] / [`ErrorResponse`] (JSON replies to clients)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Ingestion
// ============================================================================

/// A validated batch of vibration samples.
///
/// Only produced by [`crate::acquisition::decode`], so `samples` is never empty
/// and `sampling_rate` is always a positive finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    samples: Vec<f64>,
    sampling_rate: f64,
}

impl AnalysisRequest {
    pub(crate) fn new(samples: Vec<f64>, sampling_rate: f64) -> Self {
        Self {
            samples,
            sampling_rate,
        }
    }

    /// Time-domain samples in capture order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Output of the spectral analyzer for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Root-mean-square of the samples (>= 0)
    pub rms: f64,
    /// Frequency of the strongest bin in `[0, sampling_rate / 2]` (Hz)
    pub dominant_frequency: f64,
}

// ============================================================================
// History
// ============================================================================

/// One analysis result as retained by the history store.
///
/// Ordering in the store follows analysis completion, not sample capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub rms: f64,
    pub dominant_frequency: f64,
}

impl HistoryEntry {
    /// Stamp a result with the current time.
    pub fn now(result: AnalysisResult) -> Self {
        Self::at(Utc::now(), result)
    }

    pub fn at(timestamp: DateTime<Utc>, result: AnalysisResult) -> Self {
        Self {
            timestamp,
            rms: result.rms,
            dominant_frequency: result.dominant_frequency,
        }
    }
}

// ============================================================================
// Wire Format
// ============================================================================

/// Success reply: `{"RMS Value": .., "Dominant Frequency": ..}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "RMS Value")]
    pub rms: f64,
    #[serde(rename = "Dominant Frequency")]
    pub dominant_frequency: f64,
}

impl From<AnalysisResult> for AnalysisResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            rms: result.rms,
            dominant_frequency: result.dominant_frequency,
        }
    }
}

/// Error reply: `{"error": ".."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
