//! In-memory record store with injectable faults.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use record_core::{
    Collection, Conversation, ConversationFilter, Message, RecordStore, StoreError,
};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// A failure injected for one project and collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Respond with [`StoreError::AccessDenied`].
    Deny,
    /// Respond with [`StoreError::Backend`] carrying this message.
    Fail(String),
    /// Panic inside the query, simulating a bug in the caller's pipeline.
    Panic,
}

/// One query received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLog {
    pub project_id: String,
    pub collection: Collection,
    /// `None` for message queries.
    pub filter: Option<ConversationFilter>,
    /// `None` for conversation queries.
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
}

/// A record store that serves fixed records from memory.
///
/// Records and faults are configured up front with the builder methods; the
/// store itself is read-only once shared. Every query is counted and logged.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    faults: HashMap<(String, Collection), Fault>,
    delays: HashMap<String, Duration>,
    query_count: AtomicUsize,
    queries: Mutex<Vec<QueryLog>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add conversations.
    pub fn with_conversations(mut self, conversations: impl IntoIterator<Item = Conversation>) -> Self {
        self.conversations.extend(conversations);
        self
    }

    /// Add messages. Insertion order does not matter.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Inject a fault for one project and collection.
    pub fn with_fault(
        mut self,
        project_id: impl Into<String>,
        collection: Collection,
        fault: Fault,
    ) -> Self {
        self.faults.insert((project_id.into(), collection), fault);
        self
    }

    /// Treat a collection as not provisioned for a project.
    pub fn deny(self, project_id: impl Into<String>, collection: Collection) -> Self {
        self.with_fault(project_id, collection, Fault::Deny)
    }

    /// Fail every query a project makes against a collection.
    pub fn fail(
        self,
        project_id: impl Into<String>,
        collection: Collection,
        message: impl Into<String>,
    ) -> Self {
        self.with_fault(project_id, collection, Fault::Fail(message.into()))
    }

    /// Delay every query a project makes.
    pub fn with_delay(mut self, project_id: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(project_id.into(), delay);
        self
    }

    /// Number of queries received so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Every query received so far, in arrival order.
    pub async fn queries(&self) -> Vec<QueryLog> {
        self.queries.lock().await.clone()
    }

    async fn enter(&self, log: QueryLog) -> Result<(), StoreError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        let project_id = log.project_id.clone();
        let collection = log.collection;
        self.queries.lock().await.push(log);

        if let Some(delay) = self.delays.get(&project_id) {
            sleep(*delay).await;
        }

        match self.faults.get(&(project_id.clone(), collection)) {
            None => Ok(()),
            Some(Fault::Deny) => Err(StoreError::AccessDenied {
                project_id,
                collection,
            }),
            Some(Fault::Fail(message)) => Err(StoreError::Backend(message.clone())),
            Some(Fault::Panic) => panic!("injected panic for {} {}", project_id, collection),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query_conversations(
        &self,
        project_id: &str,
        filter: &ConversationFilter,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        self.enter(QueryLog {
            project_id: project_id.to_string(),
            collection: Collection::Conversations,
            filter: Some(filter.clone()),
            since: None,
            limit,
        })
        .await?;

        Ok(self
            .conversations
            .iter()
            .filter(|c| c.project_id == project_id && filter.matches(c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn query_messages(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        self.enter(QueryLog {
            project_id: project_id.to_string(),
            collection: Collection::Messages,
            filter: None,
            since: Some(since),
            limit,
        })
        .await?;

        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.project_id == project_id && m.timestamp >= since)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        messages.truncate(limit);
        Ok(messages)
    }

    fn name(&self) -> &str {
        "InMemoryStore"
    }
}
