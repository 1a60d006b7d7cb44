//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the full application: health check plus the versioned API.
pub fn build_app(state: AppState) -> Router {
    let api_router = create_router(state.clone()).layer(axum::middleware::from_fn(
        middleware::logging_middleware,
    ));

    Router::new()
        // Health check (no auth)
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
