//! SQLite-backed record store.

use std::env;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use record_core::{
    Channel, Collection, Conversation, ConversationFilter, ConversationStatus, Direction, Message,
    RecordStore, StoreError,
};
use stats_database::{
    conversation, message, project, ConversationRecord, Database, DatabaseError, MessageRecord,
};
use tokio::time::timeout;

/// Default per-query timeout (10 seconds).
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// [`RecordStore`] over the `database` crate.
///
/// Unprovisioned collections surface as [`StoreError::AccessDenied`]; queries
/// exceeding the timeout surface as [`StoreError::Timeout`].
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    db: Database,
    query_timeout: Duration,
}

impl SqliteRecordStore {
    /// Create a store with the default query timeout.
    pub fn new(db: Database) -> Self {
        Self::with_timeout(db, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(db: Database, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Create a store reading `STATS_QUERY_TIMEOUT_SECS` (default: 10).
    pub fn from_env(db: Database) -> Self {
        let query_timeout = env::var("STATS_QUERY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT);
        Self::with_timeout(db, query_timeout)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn run<T>(
        &self,
        query: impl Future<Output = stats_database::Result<T>>,
    ) -> Result<T, StoreError> {
        timeout(self.query_timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))?
            .map_err(map_database_error)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn query_conversations(
        &self,
        project_id: &str,
        filter: &ConversationFilter,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        let statuses: Option<Vec<&str>> = match filter {
            ConversationFilter::All => None,
            ConversationFilter::StatusIn(statuses) => {
                Some(statuses.iter().map(ConversationStatus::as_str).collect())
            }
        };

        let rows = self
            .run(conversation::list_conversations(
                self.db.pool(),
                project_id,
                statuses.as_deref(),
                to_sql_limit(limit),
            ))
            .await?;

        Ok(rows.into_iter().map(to_conversation).collect())
    }

    async fn query_messages(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = self
            .run(message::list_messages_since(
                self.db.pool(),
                project_id,
                since,
                to_sql_limit(limit),
            ))
            .await?;

        rows.into_iter().map(to_message).collect()
    }

    fn name(&self) -> &str {
        "SqliteRecordStore"
    }
}

fn map_database_error(err: DatabaseError) -> StoreError {
    match err {
        DatabaseError::NotProvisioned {
            project_id,
            collection,
        } => StoreError::AccessDenied {
            project_id,
            collection: if collection == project::MESSAGES {
                Collection::Messages
            } else {
                Collection::Conversations
            },
        },
        other => StoreError::Backend(other.to_string()),
    }
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn to_conversation(record: ConversationRecord) -> Conversation {
    Conversation {
        status: ConversationStatus::from_stored(&record.status),
        id: record.id,
        project_id: record.project_id,
        lead_id: record.lead_id,
    }
}

fn to_message(record: MessageRecord) -> Result<Message, StoreError> {
    let direction = Direction::parse(&record.direction).ok_or_else(|| {
        StoreError::Malformed(format!(
            "message {} has unknown direction {:?}",
            record.id, record.direction
        ))
    })?;

    Ok(Message {
        channel: Channel::from_stored(&record.channel),
        id: record.id,
        project_id: record.project_id,
        timestamp: record.created_at,
        direction,
        sender_id: record.sender_id,
        recipient_id: record.recipient_id,
    })
}
