//! HTTP and WebSocket surface using Axum
//!
//! - WebSocket ingestion at `/` (alias `/ws`)
//! - Read-only v1 API for dashboards (history, trends, status)
//! - `/health` liveness probe

pub mod handlers;
mod routes;
pub mod ws;

pub use handlers::DashboardState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `VIBRATION_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for an externally hosted dashboard.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("VIBRATION_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::health_routes(state.clone()))
        .merge(routes::ws_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
