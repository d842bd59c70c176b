//! Error types for the dashboard API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_stats::StatsError;
use thiserror::Error;

/// Errors that can occur in the dashboard API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Refresh error.
    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// The request could not be understood.
    #[error("{0}")]
    BadRequest(String),

    /// No stats for the requested project.
    #[error("No stats for project {0}")]
    NotFound(String),
}

impl AdminError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AdminError::Stats(StatsError::Superseded) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AdminError::Stats(err) => {
                tracing::error!("Refresh failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to refresh statistics".to_string(),
                )
            }
            AdminError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AdminError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AdminError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let (status, _) = AdminError::from(StatsError::Superseded).status_and_message();
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = AdminError::NotFound("shop".to_string()).status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, message) =
            AdminError::BadRequest("Invalid refresh request".to_string()).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid refresh request");
    }

    #[test]
    fn test_batch_failure_hides_detail() {
        let err = AdminError::from(StatsError::BatchFailed("task 7 panicked".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("panicked"));

        let err = AdminError::from(StatsError::InvalidProjectId(String::new()));
        let (status, _) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
