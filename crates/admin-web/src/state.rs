//! Application state shared across handlers.

use std::sync::Arc;

use chat_stats::{RefreshController, SqliteRecordStore};
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Stats refresh controller.
    pub stats: Arc<RefreshController<SqliteRecordStore>>,
    /// Projects refreshed when a request names none.
    pub projects: Arc<Vec<String>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        stats: RefreshController<SqliteRecordStore>,
        projects: Vec<String>,
    ) -> Self {
        Self {
            db,
            stats: Arc::new(stats),
            projects: Arc::new(projects),
        }
    }

    /// Projects to refresh by default: the configured list, or every
    /// provisioned project when none is configured.
    pub async fn default_projects(&self) -> database::Result<Vec<String>> {
        if !self.projects.is_empty() {
            return Ok(self.projects.as_ref().clone());
        }
        database::project::list_projects(self.db.pool()).await
    }
}
