//! Presentation adapter - trend views pulled from history snapshots
//!
//! Nothing here holds a reference into the live history. Each render tick
//! takes a fresh [`HistorySnapshot`] and derives plot-ready series from it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::storage::{HistorySnapshot, HistoryStore};

/// Column-oriented trend data, one point per history entry (oldest first).
///
/// Matches the two charts of the operator dashboard: RMS over time and
/// dominant frequency over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub rms_values: Vec<f64>,
    pub dominant_frequencies: Vec<f64>,
}

impl TrendSeries {
    pub fn from_snapshot(snapshot: &HistorySnapshot) -> Self {
        let len = snapshot.len();
        let mut series = Self {
            timestamps: Vec::with_capacity(len),
            rms_values: Vec::with_capacity(len),
            dominant_frequencies: Vec::with_capacity(len),
        };
        for entry in snapshot {
            series.timestamps.push(entry.timestamp);
            series.rms_values.push(entry.rms);
            series.dominant_frequencies.push(entry.dominant_frequency);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Summary statistics over one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    pub count: usize,
    pub latest_rms: Option<f64>,
    pub latest_dominant_frequency: Option<f64>,
    pub mean_rms: Option<f64>,
    pub min_rms: Option<f64>,
    pub max_rms: Option<f64>,
    pub mean_dominant_frequency: Option<f64>,
}

impl TrendSummary {
    pub fn from_snapshot(snapshot: &HistorySnapshot) -> Self {
        let count = snapshot.len();
        let latest = snapshot.latest();

        if count == 0 {
            return Self {
                count,
                latest_rms: None,
                latest_dominant_frequency: None,
                mean_rms: None,
                min_rms: None,
                max_rms: None,
                mean_dominant_frequency: None,
            };
        }

        let n = count as f64;
        let rms_sum: f64 = snapshot.iter().map(|e| e.rms).sum();
        let freq_sum: f64 = snapshot.iter().map(|e| e.dominant_frequency).sum();
        let min_rms = snapshot.iter().map(|e| e.rms).fold(f64::INFINITY, f64::min);
        let max_rms = snapshot.iter().map(|e| e.rms).fold(f64::NEG_INFINITY, f64::max);

        Self {
            count,
            latest_rms: latest.map(|e| e.rms),
            latest_dominant_frequency: latest.map(|e| e.dominant_frequency),
            mean_rms: Some(rms_sum / n),
            min_rms: Some(min_rms),
            max_rms: Some(max_rms),
            mean_dominant_frequency: Some(freq_sum / n),
        }
    }
}

/// Trend series plus summary, as served by `GET /api/v1/trends`.
#[derive(Debug, Clone, Serialize)]
pub struct TrendView {
    pub capacity: usize,
    pub taken_at: DateTime<Utc>,
    pub summary: TrendSummary,
    pub series: TrendSeries,
}

impl TrendView {
    pub fn from_snapshot(snapshot: &HistorySnapshot) -> Self {
        Self {
            capacity: snapshot.capacity(),
            taken_at: snapshot.taken_at(),
            summary: TrendSummary::from_snapshot(snapshot),
            series: TrendSeries::from_snapshot(snapshot),
        }
    }
}

// ============================================================================
// Periodic Reporter
// ============================================================================

/// Pulls a snapshot on every tick and logs the trend summary.
pub struct TrendReporter {
    history: Arc<HistoryStore>,
    interval: Duration,
}

impl TrendReporter {
    pub fn new(history: Arc<HistoryStore>, interval: Duration) -> Self {
        Self { history, interval }
    }

    /// One render tick.
    pub fn tick(&self) -> TrendSummary {
        let snapshot = self.history.snapshot();
        TrendSummary::from_snapshot(&snapshot)
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("[TrendReporter] Received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let summary = self.tick();
                    if summary.count == 0 {
                        info!("[TrendReporter] No analyses yet");
                        continue;
                    }
                    info!(
                        count = summary.count,
                        latest_rms = summary.latest_rms.unwrap_or_default(),
                        latest_freq_hz = summary.latest_dominant_frequency.unwrap_or_default(),
                        mean_rms = summary.mean_rms.unwrap_or_default(),
                        max_rms = summary.max_rms.unwrap_or_default(),
                        "[TrendReporter] Historical trends"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisResult, HistoryEntry};

    fn store_with(values: &[(f64, f64)]) -> Arc<HistoryStore> {
        let store = Arc::new(HistoryStore::new(10).unwrap());
        for &(rms, dominant_frequency) in values {
            store.append(HistoryEntry::now(AnalysisResult {
                rms,
                dominant_frequency,
            }));
        }
        store
    }

    #[test]
    fn test_series_follow_history_order() {
        let store = store_with(&[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
        let series = TrendSeries::from_snapshot(&store.snapshot());

        assert_eq!(series.len(), 3);
        assert_eq!(series.rms_values, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.dominant_frequencies, vec![10.0, 20.0, 30.0]);
        assert!(series.timestamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_summary_of_empty_history() {
        let store = store_with(&[]);
        let summary = TrendSummary::from_snapshot(&store.snapshot());
        assert_eq!(summary.count, 0);
        assert!(summary.mean_rms.is_none());
        assert!(summary.latest_rms.is_none());
    }

    #[test]
    fn test_summary_statistics() {
        let store = store_with(&[(1.0, 10.0), (4.0, 20.0), (2.5, 60.0)]);
        let summary = TrendSummary::from_snapshot(&store.snapshot());

        assert_eq!(summary.count, 3);
        assert_eq!(summary.latest_rms, Some(2.5));
        assert_eq!(summary.latest_dominant_frequency, Some(60.0));
        assert_eq!(summary.min_rms, Some(1.0));
        assert_eq!(summary.max_rms, Some(4.0));
        assert!((summary.mean_rms.unwrap() - 2.5).abs() < 1e-12);
        assert!((summary.mean_dominant_frequency.unwrap() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_reporter_tick_sees_new_entries() {
        let store = store_with(&[(1.0, 10.0)]);
        let reporter = TrendReporter::new(Arc::clone(&store), Duration::from_secs(1));
        assert_eq!(reporter.tick().count, 1);

        store.append(HistoryEntry::now(AnalysisResult {
            rms: 2.0,
            dominant_frequency: 5.0,
        }));
        assert_eq!(reporter.tick().count, 2);
    }

    #[tokio::test]
    async fn test_reporter_stops_on_cancel() {
        let store = store_with(&[]);
        let reporter = TrendReporter::new(store, Duration::from_millis(10));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(reporter.run(cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
