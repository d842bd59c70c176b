//! Dashboard API for chat activity statistics.
//!
//! Serves the latest refresh snapshot as JSON and runs refreshes on demand or
//! on a fixed interval.

mod config;
mod error;
mod routes;
mod state;

use std::time::Duration;

use chat_stats::{RefreshController, SqliteRecordStore, StatsConfig, StatsError};
use database::Database;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chat_stats=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let stats_config = StatsConfig::from_env()?;
    info!(addr = %config.addr, "Starting dashboard server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build application state
    let store = SqliteRecordStore::from_env(db.clone());
    let controller = RefreshController::new(store, stats_config);
    let state = AppState::new(db, controller, config.projects.clone());

    if let Some(period) = config.refresh_interval {
        info!(secs = period.as_secs(), "Background refresh enabled");
        tokio::spawn(refresh_loop(state.clone(), period));
    }

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Dashboard server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Refresh the default projects every `period`.
async fn refresh_loop(state: AppState, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;

        let project_ids = match state.default_projects().await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(error = %err, "Failed to list projects for background refresh");
                continue;
            }
        };

        match state.stats.refresh(&project_ids).await {
            Ok(snapshot) => debug!(
                projects = snapshot.projects.len(),
                "Background refresh complete"
            ),
            Err(StatsError::Superseded) => debug!("Background refresh superseded"),
            Err(err) => warn!(error = %err, "Background refresh failed"),
        }
    }
}
