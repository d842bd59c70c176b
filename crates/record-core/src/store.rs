//! The record store trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::records::{Conversation, ConversationStatus, Message};

/// Which conversations a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationFilter {
    /// Every conversation of the project.
    All,
    /// Conversations whose status is in the set.
    StatusIn(Vec<ConversationStatus>),
}

impl ConversationFilter {
    /// Conversations that are still open: active or pending.
    pub fn active() -> Self {
        Self::StatusIn(vec![ConversationStatus::Active, ConversationStatus::Pending])
    }

    /// Check whether a conversation passes the filter.
    pub fn matches(&self, conversation: &Conversation) -> bool {
        match self {
            Self::All => true,
            Self::StatusIn(statuses) => statuses.contains(&conversation.status),
        }
    }
}

/// Read-only query interface over a project's conversations and messages.
///
/// Implementations own their timeouts. A collection that is not provisioned
/// for a project must fail with [`StoreError::AccessDenied`]; every other
/// failure uses one of the remaining variants.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch up to `limit` conversations of a project matching `filter`.
    async fn query_conversations(
        &self,
        project_id: &str,
        filter: &ConversationFilter,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Fetch up to `limit` messages created at or after `since`, newest first.
    async fn query_messages(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;

    /// Backend name for logs.
    fn name(&self) -> &str {
        "RecordStore"
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn query_conversations(
        &self,
        project_id: &str,
        filter: &ConversationFilter,
        limit: usize,
    ) -> Result<Vec<Conversation>, StoreError> {
        (**self).query_conversations(project_id, filter, limit).await
    }

    async fn query_messages(
        &self,
        project_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        (**self).query_messages(project_id, since, limit).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filter() {
        let filter = ConversationFilter::active();
        let active = Conversation::new("p", "1", ConversationStatus::Active);
        let pending = Conversation::new("p", "2", ConversationStatus::Pending);
        let closed = Conversation::new("p", "3", ConversationStatus::Closed);
        let other = Conversation::new("p", "4", ConversationStatus::Other);

        assert!(filter.matches(&active));
        assert!(filter.matches(&pending));
        assert!(!filter.matches(&closed));
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_all_filter() {
        let closed = Conversation::new("p", "3", ConversationStatus::Closed);
        assert!(ConversationFilter::All.matches(&closed));
    }

    struct FixedStore;

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn query_conversations(
            &self,
            project_id: &str,
            _filter: &ConversationFilter,
            _limit: usize,
        ) -> Result<Vec<Conversation>, StoreError> {
            Ok(vec![Conversation::new(project_id, "c1", ConversationStatus::Active)])
        }

        async fn query_messages(
            &self,
            _project_id: &str,
            _since: DateTime<Utc>,
            _limit: usize,
        ) -> Result<Vec<Message>, StoreError> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "FixedStore"
        }
    }

    #[tokio::test]
    async fn test_arc_delegates() {
        let store: Arc<dyn RecordStore> = Arc::new(FixedStore);
        let conversations = store
            .query_conversations("shop", &ConversationFilter::All, 10)
            .await
            .unwrap();

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].project_id, "shop");
        assert_eq!(store.name(), "FixedStore");
    }
}
