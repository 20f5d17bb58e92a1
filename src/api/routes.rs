//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Chain
        .route("/chain", get(handlers::full_chain))
        .route("/mine", get(handlers::mine))
        .route("/transactions/new", post(handlers::new_transaction))
        // Peers
        .route("/nodes/register", post(handlers::register_nodes))
        .route("/nodes/resolve", get(handlers::consensus))
        .with_state(state)
        .layer(cors)
}
