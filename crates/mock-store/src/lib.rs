//! Mock record store implementations for project statistics.
//!
//! This crate provides an in-memory implementation of the `RecordStore` trait
//! for tests and demos:
//! - `InMemoryStore` - Serves fixed records, with per-project injected faults
//!   (access denied, backend failure, panic) and per-project latency
//!
//! For a persistent backend, use `chat_stats::SqliteRecordStore` instead.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use mock_store::{Collection, ConversationFilter, InMemoryStore, Message, RecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_store::StoreError> {
//!     let now = Utc::now();
//!     let store = InMemoryStore::new()
//!         .with_messages(vec![Message::inbound("shop", "m1", now, "visitor")])
//!         .deny("shop", Collection::Conversations);
//!
//!     let messages = store.query_messages("shop", now, 500).await?;
//!     assert_eq!(messages.len(), 1);
//!
//!     let denied = store
//!         .query_conversations("shop", &ConversationFilter::All, 1000)
//!         .await;
//!     assert!(denied.unwrap_err().is_access_denied());
//!     Ok(())
//! }
//! ```

mod memory;

// Re-export record-core types for convenience
pub use record_core::{
    async_trait, Channel, Collection, Conversation, ConversationFilter, ConversationStatus,
    Direction, Message, RecordStore, StoreError,
};

pub use memory::{Fault, InMemoryStore, QueryLog};
