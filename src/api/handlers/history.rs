//! History endpoints: raw snapshot and trend series

use axum::extract::State;
use axum::Json;

use crate::presentation::TrendView;
use crate::storage::HistorySnapshot;

use super::DashboardState;

/// GET /api/v1/history - Point-in-time copy of the analysis history
pub async fn get_history(State(state): State<DashboardState>) -> Json<HistorySnapshot> {
    Json(state.history.snapshot())
}

/// GET /api/v1/trends - RMS and dominant-frequency series with summary stats
pub async fn get_trends(State(state): State<DashboardState>) -> Json<TrendView> {
    let snapshot = state.history.snapshot();
    Json(TrendView::from_snapshot(&snapshot))
}
