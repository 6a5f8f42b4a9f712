//! HTTP API module.
//!
//! The transport boundary is thin plumbing: handlers call straight into the
//! admission engine and engine errors map to status codes via
//! [`QueueError::into_response`](crate::error::QueueError).

mod queue;
mod types;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use types::AppState;

/// Create CORS layer based on environment configuration.
/// Set CORS_ALLOW_ORIGIN for production (comma-separated list of origins);
/// unset allows all origins (development mode).
fn create_cors_layer() -> CorsLayer {
    match std::env::var("CORS_ALLOW_ORIGIN").ok() {
        Some(origins) if !origins.is_empty() && origins != "*" => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        }
        _ => CorsLayer::permissive(),
    }
}

/// Create the HTTP router with the waiting-queue routes.
pub fn create_router(state: AppState) -> Router {
    let cors = create_cors_layer();

    Router::new()
        .route("/queue", post(queue::register))
        .route("/queue/allow", post(queue::allow))
        .route("/queue/allowed", get(queue::allowed))
        .route("/queue/rank", get(queue::rank))
        .route("/queue/leave", post(queue::leave))
        .route("/queue/heartbeat", post(queue::heartbeat))
        .route("/health", get(queue::health))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests;
