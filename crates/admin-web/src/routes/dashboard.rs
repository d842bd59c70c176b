//! Dashboard routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use chat_stats::{GlobalStats, ProjectStats, RefreshStatus, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub status: RefreshStatus,
    pub error: Option<String>,
    pub computed_at: Option<DateTime<Utc>>,
    pub global: GlobalStats,
    /// Busiest projects first.
    pub projects: Vec<ProjectStats>,
}

impl StatsResponse {
    fn new(status: RefreshStatus, error: Option<String>, snapshot: Option<&Snapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                status,
                error,
                computed_at: Some(snapshot.computed_at),
                global: snapshot.global.clone(),
                projects: snapshot.ranked().into_iter().cloned().collect(),
            },
            None => Self {
                status,
                error,
                computed_at: None,
                global: GlobalStats::default(),
                projects: Vec::new(),
            },
        }
    }
}

/// Refresh request body.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Projects to refresh. Falls back to the default list when absent.
    #[serde(default)]
    pub project_ids: Option<Vec<String>>,
}

/// Get the latest published statistics.
pub async fn stats_api(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.stats.snapshot().await;
    let status = state.stats.status().await;
    let error = state.stats.error().await;
    Json(StatsResponse::new(status, error, snapshot.as_ref()))
}

/// Run a refresh and return the new statistics.
///
/// An empty body refreshes the default projects; any other body must be a
/// valid [`RefreshRequest`].
pub async fn refresh_api(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatsResponse>> {
    let request = parse_refresh_request(&body)?;
    let project_ids = match request.project_ids {
        Some(ids) => ids,
        None => state.default_projects().await?,
    };

    info!(projects = project_ids.len(), "Refresh requested");
    let snapshot = state.stats.refresh(&project_ids).await?;

    Ok(Json(StatsResponse::new(
        RefreshStatus::Ready,
        None,
        Some(&snapshot),
    )))
}

fn parse_refresh_request(body: &[u8]) -> Result<RefreshRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RefreshRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AdminError::BadRequest(format!("Invalid refresh request: {}", err)))
}

/// List provisioned projects.
pub async fn projects_api(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let projects = database::project::list_projects(state.db.pool()).await?;
    Ok(Json(projects))
}

/// Get one project's statistics from the latest snapshot.
pub async fn project_stats_api(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectStats>> {
    state
        .stats
        .get_stats(&project_id)
        .await
        .map(Json)
        .ok_or(AdminError::NotFound(project_id))
}
