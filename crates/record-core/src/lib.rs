//! Core trait and types for chat record stores.
//!
//! This crate provides the read-only interface the statistics engine uses to
//! reach conversation and message records. It defines:
//!
//! - [`RecordStore`] - The trait that all record store backends must implement
//! - [`Conversation`] / [`Message`] - The raw records a project accumulates
//! - [`ConversationFilter`] - Status filtering for conversation queries
//! - [`StoreError`] - Error types for store queries
//!
//! # Example
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use record_core::{
//!     async_trait, Conversation, ConversationFilter, Message, RecordStore, StoreError,
//! };
//!
//! struct EmptyStore;
//!
//! #[async_trait]
//! impl RecordStore for EmptyStore {
//!     async fn query_conversations(
//!         &self,
//!         _project_id: &str,
//!         _filter: &ConversationFilter,
//!         _limit: usize,
//!     ) -> Result<Vec<Conversation>, StoreError> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn query_messages(
//!         &self,
//!         _project_id: &str,
//!         _since: DateTime<Utc>,
//!         _limit: usize,
//!     ) -> Result<Vec<Message>, StoreError> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

mod error;
mod records;
mod store;

pub use error::{Collection, StoreError};
pub use records::{Channel, Conversation, ConversationStatus, Direction, Message};
pub use store::{ConversationFilter, RecordStore};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
