//! Error types for record store queries.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A logical record set that can be provisioned per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Conversations,
    Messages,
}

impl Collection {
    /// Stable storage name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversations => "conversations",
            Self::Messages => "messages",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while querying a record store.
///
/// Consumers only distinguish two classes: [`StoreError::AccessDenied`]
/// (the collection is not provisioned for the project) and everything else.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The collection is not provisioned for this project.
    #[error("access denied: {collection} not provisioned for project {project_id}")]
    AccessDenied {
        project_id: String,
        collection: Collection,
    },

    /// The query did not complete in time.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The backend failed (connection, query, etc.)
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Whether this failure means "feature not provisioned" rather than a fault.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}
