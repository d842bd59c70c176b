//! Route handlers for the dashboard API.

pub mod dashboard;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/stats", get(dashboard::stats_api))
        .route("/api/refresh", post(dashboard::refresh_api))
        .route("/api/projects", get(dashboard::projects_api))
        .route(
            "/api/projects/:project_id/stats",
            get(dashboard::project_stats_api),
        )
}
