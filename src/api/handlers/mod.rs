//! API route handlers
//!
//! Read-only endpoints for the monitoring dashboard:
//! - Liveness and pipeline status
//! - Analysis history snapshots and trend series

mod history;
mod status;

pub use history::*;
pub use status::*;

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::config::ConnectionsConfig;
use crate::pipeline::ConnectionManager;
use crate::storage::HistoryStore;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API and WebSocket handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Client roster and message pipeline
    pub connections: Arc<ConnectionManager>,
    /// Rolling analysis history (read via snapshots only)
    pub history: Arc<HistoryStore>,
    /// Per-client queue sizing
    pub queues: ConnectionsConfig,
    /// Cancelled when the service stops; closes open sockets
    pub shutdown: CancellationToken,
    pub started_at: Instant,
}

impl DashboardState {
    pub fn new(
        connections: Arc<ConnectionManager>,
        queues: ConnectionsConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            history: Arc::clone(connections.history()),
            connections,
            queues,
            shutdown,
            started_at: Instant::now(),
        }
    }

    /// State with a fresh history of `capacity`, for tests and tooling.
    pub fn with_capacity(capacity: usize) -> Result<Self, crate::storage::StorageError> {
        let history = Arc::new(HistoryStore::new(capacity)?);
        Ok(Self::new(
            Arc::new(ConnectionManager::new(history)),
            ConnectionsConfig::default(),
            CancellationToken::new(),
        ))
    }
}
