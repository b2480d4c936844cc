//! Link-issuing HTTP service for PathHub.
//!
//! Stores submitted paths under short ids and serves `/s/{id}` pages that
//! hand the `pathhub://` URL to the browser.

pub mod config;
pub mod error;
pub mod handlers;
pub mod store;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{create_share_handler, health_handler, share_page_handler, stats_handler, AppState};

/// Build the service router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/share", post(create_share_handler))
        .route("/s/{id}", get(share_page_handler))
        .route("/api/stats/{id}", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
