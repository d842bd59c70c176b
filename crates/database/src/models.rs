//! Database models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored conversation row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConversationRecord {
    /// Owning project.
    pub project_id: String,
    /// Conversation ID, unique within the project.
    pub id: String,
    /// Status as written by the messaging subsystem (e.g., "active", "closed").
    pub status: String,
    /// Captured lead, if any.
    pub lead_id: Option<String>,
}

/// A stored message row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    /// Message ID.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// "inbound" or "outbound".
    pub direction: String,
    /// Channel name (e.g., "web", "whatsapp").
    pub channel: String,
    /// Sending participant.
    pub sender_id: String,
    /// Receiving participant.
    pub recipient_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
