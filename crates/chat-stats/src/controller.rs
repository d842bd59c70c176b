//! Refresh controller: the entry point dashboards call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use record_core::RecordStore;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use crate::aggregator::{normalize_project_ids, ProjectAggregator};
use crate::config::StatsConfig;
use crate::error::StatsError;
use crate::models::{GlobalStats, ProjectStats, Snapshot};

/// Where the controller is in its refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    /// No refresh has run yet.
    #[default]
    Idle,
    /// A refresh is in flight.
    Loading,
    /// The latest refresh published a snapshot.
    Ready,
    /// The latest refresh failed as a whole; see [`RefreshController::error`].
    Failed,
}

#[derive(Debug, Default)]
struct ControllerState {
    status: RefreshStatus,
    snapshot: Option<Snapshot>,
    error: Option<String>,
}

/// State shared with in-flight refresh tasks.
#[derive(Debug, Default)]
struct Shared {
    /// Bumped by every refresh call; only the newest may publish.
    generation: AtomicU64,
    state: RwLock<ControllerState>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn set_loading(&self, generation: u64) {
        let mut state = self.state.write().await;
        if self.is_current(generation) {
            state.status = RefreshStatus::Loading;
        }
    }

    /// Publish a snapshot if `generation` is still the newest call.
    async fn publish(&self, generation: u64, snapshot: &Snapshot) -> bool {
        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            return false;
        }
        state.status = RefreshStatus::Ready;
        state.snapshot = Some(snapshot.clone());
        state.error = None;
        true
    }

    /// Record a batch failure. The previous snapshot stays readable.
    async fn fail(&self, generation: u64, err: &StatsError) {
        let mut state = self.state.write().await;
        if self.is_current(generation) {
            state.status = RefreshStatus::Failed;
            state.error = Some(err.to_string());
        }
    }
}

/// Runs refreshes and exposes the latest published snapshot.
///
/// Calls are last-write-wins: a new [`refresh`](Self::refresh) aborts the one
/// in flight, whose caller receives [`StatsError::Superseded`].
pub struct RefreshController<S: RecordStore + 'static> {
    aggregator: ProjectAggregator<S>,
    shared: Arc<Shared>,
    inflight: Mutex<Option<AbortHandle>>,
}

impl<S: RecordStore + 'static> RefreshController<S> {
    /// Create a controller over a store.
    pub fn new(store: S, config: StatsConfig) -> Self {
        Self::with_aggregator(ProjectAggregator::new(store, config))
    }

    /// Create a controller around an existing aggregator.
    pub fn with_aggregator(aggregator: ProjectAggregator<S>) -> Self {
        Self {
            aggregator,
            shared: Arc::new(Shared::default()),
            inflight: Mutex::new(None),
        }
    }

    pub fn aggregator(&self) -> &ProjectAggregator<S> {
        &self.aggregator
    }

    /// Refresh stats for `project_ids` as of now.
    pub async fn refresh(&self, project_ids: &[String]) -> Result<Snapshot, StatsError> {
        self.refresh_at(project_ids, Utc::now()).await
    }

    /// Refresh stats for `project_ids` with every window ending at `now`.
    ///
    /// An empty list publishes an empty snapshot without touching the store.
    pub async fn refresh_at(
        &self,
        project_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<Snapshot, StatsError> {
        let mut inflight = self.inflight.lock().await;
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = inflight.take() {
            debug!(generation, "Superseding in-flight refresh");
            previous.abort();
        }

        let normalized = self
            .aggregator
            .config()
            .validate()
            .and_then(|()| normalize_project_ids(project_ids));
        let project_ids = match normalized {
            Ok(ids) => ids,
            Err(err) => {
                drop(inflight);
                error!("Refresh rejected: {}", err);
                self.shared.fail(generation, &err).await;
                return Err(err);
            }
        };

        if project_ids.is_empty() {
            drop(inflight);
            let snapshot = Snapshot::empty(now);
            self.shared.publish(generation, &snapshot).await;
            return Ok(snapshot);
        }

        self.shared.set_loading(generation).await;
        info!(generation, projects = project_ids.len(), "Refresh started");

        let aggregator = self.aggregator.clone();
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let projects = aggregator.collect(&project_ids, now).await;
            let snapshot = Snapshot::from_projects(projects, now);
            let published = shared.publish(generation, &snapshot).await;
            (snapshot, published)
        });
        *inflight = Some(handle.abort_handle());
        drop(inflight);

        match handle.await {
            Ok((snapshot, true)) => {
                info!(
                    generation,
                    active_projects = snapshot.global.projects_with_activity,
                    "Refresh complete"
                );
                Ok(snapshot)
            }
            Ok((_, false)) => Err(StatsError::Superseded),
            Err(err) if err.is_cancelled() => Err(StatsError::Superseded),
            Err(err) => {
                let err = StatsError::BatchFailed(err.to_string());
                error!("Refresh failed: {}", err);
                self.shared.fail(generation, &err).await;
                Err(err)
            }
        }
    }

    /// Stats of one project from the latest published snapshot.
    pub async fn get_stats(&self, project_id: &str) -> Option<ProjectStats> {
        self.shared
            .state
            .read()
            .await
            .snapshot
            .as_ref()
            .and_then(|s| s.get(project_id).cloned())
    }

    /// Global summary of the latest published snapshot, zeroed before any.
    pub async fn global_stats(&self) -> GlobalStats {
        self.shared
            .state
            .read()
            .await
            .snapshot
            .as_ref()
            .map(|s| s.global.clone())
            .unwrap_or_default()
    }

    /// The latest published snapshot.
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.shared.state.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> RefreshStatus {
        self.shared.state.read().await.status
    }

    pub async fn is_loading(&self) -> bool {
        self.status().await == RefreshStatus::Loading
    }

    /// Message of the latest batch failure, cleared by the next success.
    pub async fn error(&self) -> Option<String> {
        self.shared.state.read().await.error.clone()
    }
}
