//! Chat activity aggregation engine for project dashboards.
//!
//! This crate provides the [`RefreshController`] type which turns raw
//! conversation and message records into per-project and global statistics.
//!
//! # Features
//!
//! - Counts open conversations, leads and message volume per project
//! - Pairs inbound messages with replies to estimate response time
//! - Flags week-over-week momentum (up, down or stable)
//! - Breaks message volume down by channel
//! - Degrades per data source instead of failing a whole project
//! - Aggregates projects concurrently, isolating failures per project
//!
//! # Architecture
//!
//! ```text
//! refresh(project_ids)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   REFRESH CONTROLLER                        │
//! │                                                             │
//! │  1. Validate and dedupe ids (empty list → empty snapshot)   │
//! │         ↓                                                   │
//! │  2. Fan out, bounded, one task per project:                 │
//! │     • active conversations  ┐                               │
//! │     • 7-day messages        ├─ concurrent fetches           │
//! │     • all conversations     ┘                               │
//! │     • response time, trend, channel breakdown               │
//! │         ↓                                                   │
//! │  3. Collect ProjectStats into one map                       │
//! │         ↓                                                   │
//! │  4. Fold GlobalStats, publish unless superseded             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_stats::{RefreshController, SqliteRecordStore, StatsConfig};
//! use stats_database::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:chat-stats.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let controller = RefreshController::new(SqliteRecordStore::new(db), StatsConfig::from_env()?);
//!     let snapshot = controller.refresh(&["acme-shop".to_string()]).await?;
//!
//!     println!("Messages (24h): {}", snapshot.global.total_messages_24h);
//!     Ok(())
//! }
//! ```

mod aggregator;
pub mod channels;
mod config;
mod controller;
mod error;
mod models;
pub mod response_time;
mod rollup;
mod sqlite_store;
pub mod trend;

// Public exports
pub use aggregator::{normalize_project_ids, summarize, ProjectAggregator};
pub use config::StatsConfig;
pub use controller::{RefreshController, RefreshStatus};
pub use error::StatsError;
pub use models::{ChannelCount, GlobalStats, ProjectStats, Snapshot, Trend};
pub use response_time::{PairingRule, ResponseTimeEstimate};
pub use sqlite_store::SqliteRecordStore;
pub use trend::TrendResult;

// Re-export commonly used types from dependencies
pub use record_core::{
    Channel, Collection, Conversation, ConversationFilter, ConversationStatus, Direction, Message,
    RecordStore, StoreError,
};
