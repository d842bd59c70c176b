//! Per-project aggregation pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use record_core::{ConversationFilter, Message, RecordStore, StoreError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channels;
use crate::config::StatsConfig;
use crate::error::StatsError;
use crate::models::{ProjectStats, Snapshot};
use crate::response_time;
use crate::trend;

/// Computes [`ProjectStats`] for projects against a record store.
///
/// Every project is fetched and summarized independently. Fetch failures
/// degrade the affected numbers to zero; a panicking pipeline yields
/// [`ProjectStats::empty`]. Neither affects sibling projects.
pub struct ProjectAggregator<S: RecordStore> {
    store: Arc<S>,
    config: Arc<StatsConfig>,
}

impl<S: RecordStore> Clone for ProjectAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: RecordStore + 'static> ProjectAggregator<S> {
    /// Create an aggregator owning its store.
    pub fn new(store: S, config: StatsConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create an aggregator over a shared store.
    pub fn with_shared_store(store: Arc<S>, config: StatsConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Compute stats for one project.
    ///
    /// The three fetches run concurrently. This never fails: an unavailable
    /// data source contributes zero.
    pub async fn aggregate(&self, project_id: &str, now: DateTime<Utc>) -> ProjectStats {
        let config = &self.config;
        let since = now - config.lookback;
        let open = ConversationFilter::active();

        let (active, messages, all) = tokio::join!(
            self.store
                .query_conversations(project_id, &open, config.active_conversation_limit),
            self.store
                .query_messages(project_id, since, config.message_limit),
            self.store.query_conversations(
                project_id,
                &ConversationFilter::All,
                config.conversation_limit
            ),
        );

        let active_conversations = degrade(project_id, "active conversations", active).len() as u64;
        let messages = degrade(project_id, "messages", messages);
        let total_leads = degrade(project_id, "conversations", all)
            .iter()
            .filter(|c| c.has_lead())
            .count() as u64;

        let stats = summarize(
            project_id,
            now,
            active_conversations,
            total_leads,
            &messages,
            config,
        );

        debug!(
            project_id = %project_id,
            messages = stats.total_messages,
            active = stats.active_conversations,
            leads = stats.total_leads,
            "Project aggregated"
        );
        stats
    }

    /// Compute stats for many projects with bounded concurrency.
    ///
    /// Each pipeline runs in its own task; results are gathered by a single
    /// collector. Dropping the returned future aborts outstanding pipelines.
    /// Repeated ids are fetched once.
    pub async fn collect(
        &self,
        project_ids: &[String],
        now: DateTime<Utc>,
    ) -> HashMap<String, ProjectStats> {
        let limit = self.config.max_concurrent_projects.max(1);
        let mut seen = HashSet::new();
        let unique: Vec<String> = project_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        stream::iter(unique)
            .map(|project_id| {
                let aggregator = self.clone();
                async move {
                    let task_id = project_id.clone();
                    let task = AbortOnDrop(tokio::spawn(async move {
                        aggregator.aggregate(&task_id, now).await
                    }));

                    let stats = match task.join().await {
                        Ok(stats) => stats,
                        Err(err) => {
                            error!(
                                project_id = %project_id,
                                error = %err,
                                "Project pipeline failed, reporting empty stats"
                            );
                            ProjectStats::empty(project_id.clone())
                        }
                    };
                    (project_id, stats)
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await
    }

    /// Compute a full snapshot: per-project stats plus the global rollup.
    pub async fn snapshot(
        &self,
        project_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<Snapshot, StatsError> {
        self.config.validate()?;
        let project_ids = normalize_project_ids(project_ids)?;
        if project_ids.is_empty() {
            return Ok(Snapshot::empty(now));
        }

        info!(
            "Aggregating {} projects via {} (concurrency: {})",
            project_ids.len(),
            self.store.name(),
            self.config.max_concurrent_projects
        );
        let projects = self.collect(&project_ids, now).await;
        Ok(Snapshot::from_projects(projects, now))
    }
}

/// Build a project's stats from already-fetched data.
pub fn summarize(
    project_id: &str,
    now: DateTime<Utc>,
    active_conversations: u64,
    total_leads: u64,
    messages: &[Message],
    config: &StatsConfig,
) -> ProjectStats {
    let response =
        response_time::estimate(messages, config.pairing_rule, config.max_response_gap);
    let trend = trend::calculate(
        messages,
        now,
        config.lookback,
        config.trend_threshold_percent,
    );
    let recent_cutoff = now - config.recent_window;

    ProjectStats {
        project_id: project_id.to_string(),
        active_conversations,
        total_messages: messages.len() as u64,
        messages_24h: messages
            .iter()
            .filter(|m| m.timestamp >= recent_cutoff)
            .count() as u64,
        total_leads,
        avg_response_time_seconds: response.avg_seconds,
        last_activity: messages.iter().map(|m| m.timestamp).max(),
        channel_breakdown: channels::breakdown(messages),
        trend: trend.trend,
        trend_percentage: trend.percentage,
    }
}

/// Validate and deduplicate a project list, keeping first occurrences.
pub fn normalize_project_ids(project_ids: &[String]) -> Result<Vec<String>, StatsError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(project_ids.len());

    for project_id in project_ids {
        if project_id.trim().is_empty() {
            return Err(StatsError::InvalidProjectId(project_id.clone()));
        }
        if seen.insert(project_id.as_str()) {
            normalized.push(project_id.clone());
        }
    }
    Ok(normalized)
}

/// Unwrap a fetch result, substituting an empty value on failure.
fn degrade<T: Default>(project_id: &str, source: &str, result: Result<T, StoreError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) if err.is_access_denied() => {
            debug!(project_id = %project_id, source, "Collection not provisioned");
            T::default()
        }
        Err(err) => {
            warn!(
                project_id = %project_id,
                source,
                error = %err,
                "Fetch failed, continuing without it"
            );
            T::default()
        }
    }
}

/// Aborts the task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    async fn join(mut self) -> Result<T, tokio::task::JoinError> {
        (&mut self.0).await
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
