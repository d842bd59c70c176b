//! Conversation and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Pending,
    Closed,
    Other,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Closed => "closed",
            Self::Other => "other",
        }
    }

    /// Parse a stored status. Unknown values map to [`ConversationStatus::Other`].
    pub fn from_stored(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "pending" => Self::Pending,
            "closed" => Self::Closed,
            _ => Self::Other,
        }
    }
}

/// Which side of the chat produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From the visitor.
    Inbound,
    /// From the assistant or a human agent.
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    /// Parse a stored direction. There is no fallback variant.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

/// Communication channel a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Web,
    Whatsapp,
    Facebook,
    Instagram,
    Other,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Whatsapp => "whatsapp",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Other => "other",
        }
    }

    /// Parse a stored channel. Unknown values map to [`Channel::Other`].
    pub fn from_stored(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "web" => Self::Web,
            "whatsapp" => Self::Whatsapp,
            "facebook" => Self::Facebook,
            "instagram" => Self::Instagram,
            _ => Self::Other,
        }
    }
}

/// One chat thread belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Identifier, unique within the project.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Current status.
    pub status: ConversationStatus,
    /// Captured lead, if the conversation produced one.
    pub lead_id: Option<String>,
}

impl Conversation {
    /// Create a conversation without a lead.
    pub fn new(
        project_id: impl Into<String>,
        id: impl Into<String>,
        status: ConversationStatus,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            status,
            lead_id: None,
        }
    }

    /// Attach a captured lead.
    pub fn with_lead(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }

    pub fn has_lead(&self) -> bool {
        self.lead_id.is_some()
    }
}

/// One inbound or outbound chat event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub project_id: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub channel: Channel,
    pub sender_id: String,
    pub recipient_id: String,
}

impl Message {
    /// A web message from `visitor_id` to the project.
    pub fn inbound(
        project_id: impl Into<String>,
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        visitor_id: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        Self {
            id: id.into(),
            recipient_id: project_id.clone(),
            project_id,
            timestamp,
            direction: Direction::Inbound,
            channel: Channel::Web,
            sender_id: visitor_id.into(),
        }
    }

    /// A web reply from the project to `visitor_id`.
    pub fn outbound(
        project_id: impl Into<String>,
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        visitor_id: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        Self {
            id: id.into(),
            sender_id: project_id.clone(),
            project_id,
            timestamp,
            direction: Direction::Outbound,
            channel: Channel::Web,
            recipient_id: visitor_id.into(),
        }
    }

    /// Set the channel.
    pub fn on(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }
}
