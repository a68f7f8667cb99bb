//! API route definitions
//!
//! - `/` and `/ws` - sensor WebSocket (JSON batch in, JSON result out)
//! - /api/v1/status - Connection and history counters
//! - /api/v1/history - History snapshot
//! - /api/v1/trends - RMS / dominant-frequency trend series
//! - /health - Liveness

use axum::{routing::get, Router};

use super::handlers::{self, DashboardState};
use super::ws;

/// Read-only dashboard endpoints
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/history", get(handlers::get_history))
        .route("/trends", get(handlers::get_trends))
        .with_state(state)
}

/// Sensor ingestion sockets
pub fn ws_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(ws::ws_handler))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn create_test_state() -> DashboardState {
        DashboardState::with_capacity(10).unwrap()
    }

    #[tokio::test]
    async fn test_api_routes_status() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_history() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/history").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ws_route_rejects_plain_get() {
        let app = ws_routes(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
