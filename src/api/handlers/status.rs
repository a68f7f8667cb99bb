//! System state endpoints: health, status

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::pipeline::{ClientInfo, ConnectionStats};
use crate::storage::HistoryStats;

use super::DashboardState;

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
}

/// GET /health - Liveness probe
pub async fn health_check(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

// ============================================================================
// Status Endpoint
// ============================================================================

/// Pipeline status: connections, message counters and history fill level
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: u64,
    pub connections: ConnectionStats,
    pub history: HistoryStats,
    pub clients: Vec<ClientInfo>,
}

/// GET /api/v1/status - Current pipeline status
pub async fn get_status(State(state): State<DashboardState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_seconds: state.started_at.elapsed().as_secs(),
        connections: state.connections.stats(),
        history: state.history.stats(),
        clients: state.connections.clients(),
    })
}
