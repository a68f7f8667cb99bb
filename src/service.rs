//! Service lifecycle - explicit start/stop for the analysis server
//!
//! ```ignore
//! let mut service = VibrationService::new(ServiceConfig::load())?;
//! let addr = service.start().await?;
//! let history = service.history(); // hand to the presentation side
//! // ...
//! service.stop().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{create_app, DashboardState};
use crate::config::ServiceConfig;
use crate::pipeline::ConnectionManager;
use crate::presentation::TrendReporter;
use crate::storage::HistoryStore;

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskName {
    HttpServer,
    TrendReporter,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpServer => write!(f, "HttpServer"),
            Self::TrendReporter => write!(f, "TrendReporter"),
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Owns the history store, the connection manager and the server tasks.
pub struct VibrationService {
    config: ServiceConfig,
    history: Arc<HistoryStore>,
    connections: Arc<ConnectionManager>,
    cancel_token: CancellationToken,
    tasks: JoinSet<Result<TaskName>>,
    local_addr: Option<SocketAddr>,
}

impl VibrationService {
    /// Build the service. Nothing is bound until [`start`](Self::start).
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate().context("Invalid service configuration")?;
        let history = Arc::new(
            HistoryStore::new(config.history.capacity).context("Failed to create history store")?,
        );
        let connections = Arc::new(ConnectionManager::new(Arc::clone(&history)));

        Ok(Self {
            config,
            history,
            connections,
            cancel_token: CancellationToken::new(),
            tasks: JoinSet::new(),
            local_addr: None,
        })
    }

    /// Bind the listener and spawn the server (and optional trend reporter).
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 is used.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr {
            return Ok(addr);
        }

        let addr = self.config.listen_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read local listener address")?;

        let state = DashboardState::new(
            Arc::clone(&self.connections),
            self.config.connections.clone(),
            self.cancel_token.clone(),
        );
        let app = create_app(state);

        let cancel_token = self.cancel_token.clone();
        self.tasks.spawn(async move {
            info!("[HttpServer] Task starting");

            let result = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

            match result {
                Ok(()) => {
                    info!("[HttpServer] Graceful shutdown complete");
                    Ok(TaskName::HttpServer)
                }
                Err(e) => {
                    error!("[HttpServer] Server error: {}", e);
                    Err(anyhow::anyhow!("HTTP server error: {}", e))
                }
            }
        });

        let interval_secs = self.config.presentation.trend_report_interval_secs;
        if interval_secs > 0 {
            let reporter =
                TrendReporter::new(Arc::clone(&self.history), Duration::from_secs(interval_secs));
            let cancel_token = self.cancel_token.clone();
            self.tasks.spawn(async move {
                info!("[TrendReporter] Task starting ({}s interval)", interval_secs);
                reporter.run(cancel_token).await;
                Ok(TaskName::TrendReporter)
            });
        }

        info!(
            addr = %local_addr,
            capacity = self.history.capacity(),
            "✓ Listening for sensor clients on ws://{}",
            local_addr
        );
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Wait for the first task to fail, or for all tasks to end.
    ///
    /// A failing task cancels the others.
    pub async fn supervise(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!("🛑 Supervisor: Shutdown signal received");
                    return Ok(());
                }
                result = self.tasks.join_next() => {
                    match result {
                        Some(Ok(Ok(task_name))) => {
                            info!("Supervisor: Task {} completed normally", task_name);
                        }
                        Some(Ok(Err(e))) => {
                            error!("Supervisor: Task failed with error: {}", e);
                            self.cancel_token.cancel();
                            return Err(e);
                        }
                        Some(Err(e)) => {
                            error!("Supervisor: Task panicked: {}", e);
                            self.cancel_token.cancel();
                            return Err(anyhow::anyhow!("Task panicked: {}", e));
                        }
                        None => {
                            info!("Supervisor: All tasks completed");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Signal shutdown and wait for every task to finish.
    pub async fn stop(&mut self) -> Result<()> {
        self.cancel_token.cancel();

        let mut first_error = None;
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(task_name)) => info!("Task {} stopped", task_name),
                Ok(Err(e)) => {
                    error!("Task stopped with error: {}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("Task panicked during shutdown: {}", e);
                    first_error.get_or_insert(anyhow::anyhow!("Task panicked: {}", e));
                }
            }
        }
        self.local_addr = None;

        first_error.map_or(Ok(()), Err)
    }

    /// Token that stops the service when cancelled (e.g. from a Ctrl+C handler).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Shared history handle for presentation readers.
    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    pub fn connections(&self) -> Arc<ConnectionManager> {
        Arc::clone(&self.connections)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = local_config();
        config.history.capacity = 0;
        assert!(VibrationService::new(config).is_err());
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut service = VibrationService::new(local_config()).unwrap();
        let addr = service.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(service.local_addr(), Some(addr));

        // Second start is a no-op
        assert_eq!(service.start().await.unwrap(), addr);

        service.stop().await.unwrap();
        assert!(service.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_history_shared_with_pipeline() {
        let service = VibrationService::new(local_config()).unwrap();
        let history = service.history();
        let connections = service.connections();
        assert!(Arc::ptr_eq(&history, connections.history()));
    }

    #[tokio::test]
    async fn test_reporter_task_stops_with_service() {
        let mut config = local_config();
        config.presentation.trend_report_interval_secs = 1;
        let mut service = VibrationService::new(config).unwrap();
        service.start().await.unwrap();
        service.stop().await.unwrap();
    }
}
