//! Derived statistics types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use record_core::Channel;
use serde::Serialize;

/// Direction of chat volume compared with the preceding period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// Message count for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCount {
    pub channel: Channel,
    pub count: u64,
}

/// Statistics for one project over the lookback window.
///
/// Recomputed from scratch on every refresh; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub project_id: String,
    /// Open conversations (active or pending).
    pub active_conversations: u64,
    /// Messages in the lookback window.
    pub total_messages: u64,
    /// Messages in the last 24 hours, a subset of `total_messages`.
    pub messages_24h: u64,
    /// Conversations that captured a lead.
    pub total_leads: u64,
    /// Mean reply latency in seconds, 0 when no reply could be paired.
    pub avg_response_time_seconds: f64,
    /// Newest message timestamp in the window.
    pub last_activity: Option<DateTime<Utc>>,
    /// Per-channel counts, busiest first. Sums to `total_messages`.
    pub channel_breakdown: Vec<ChannelCount>,
    pub trend: Trend,
    /// Magnitude of the period-over-period change, never negative.
    pub trend_percentage: f64,
}

impl ProjectStats {
    /// All-zero stats, used when a project's pipeline failed outright.
    pub fn empty(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            active_conversations: 0,
            total_messages: 0,
            messages_24h: 0,
            total_leads: 0,
            avg_response_time_seconds: 0.0,
            last_activity: None,
            channel_breakdown: Vec::new(),
            trend: Trend::Stable,
            trend_percentage: 0.0,
        }
    }

    /// Whether any message arrived in the lookback window.
    pub fn has_activity(&self) -> bool {
        self.total_messages > 0
    }
}

/// Fold of every project's statistics in one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_active_chats: u64,
    pub total_messages_24h: u64,
    pub total_leads: u64,
    /// Mean of the non-zero per-project averages.
    pub avg_response_time_seconds: f64,
    pub projects_with_activity: u64,
}

/// The outcome of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// One entry per requested project.
    pub projects: HashMap<String, ProjectStats>,
    pub global: GlobalStats,
    /// Reference instant every window in this snapshot was computed against.
    pub computed_at: DateTime<Utc>,
}

impl Snapshot {
    /// A snapshot covering no projects.
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            projects: HashMap::new(),
            global: GlobalStats::default(),
            computed_at,
        }
    }

    /// Build a snapshot from per-project stats, folding the global summary.
    pub fn from_projects(
        projects: HashMap<String, ProjectStats>,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let global = GlobalStats::fold(projects.values());
        Self {
            projects,
            global,
            computed_at,
        }
    }

    pub fn get(&self, project_id: &str) -> Option<&ProjectStats> {
        self.projects.get(project_id)
    }

    /// Projects ordered by message volume, busiest first. Ties by id.
    pub fn ranked(&self) -> Vec<&ProjectStats> {
        let mut ranked: Vec<&ProjectStats> = self.projects.values().collect();
        ranked.sort_by(|a, b| {
            b.total_messages
                .cmp(&a.total_messages)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stats(id: &str, messages: u64) -> ProjectStats {
        ProjectStats {
            total_messages: messages,
            ..ProjectStats::empty(id)
        }
    }

    #[test]
    fn test_empty_project_stats() {
        let stats = ProjectStats::empty("shop");
        assert_eq!(stats.project_id, "shop");
        assert!(!stats.has_activity());
        assert_eq!(stats.trend, Trend::Stable);
        assert!(stats.channel_breakdown.is_empty());
    }

    #[test]
    fn test_ranked_by_volume() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let projects = [stats("b", 10), stats("a", 10), stats("c", 50)]
            .into_iter()
            .map(|s| (s.project_id.clone(), s))
            .collect();
        let snapshot = Snapshot::from_projects(projects, now);

        let order: Vec<&str> = snapshot
            .ranked()
            .iter()
            .map(|s| s.project_id.as_str())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(snapshot.global.projects_with_activity, 3);
    }

    #[test]
    fn test_serializes_snake_case() {
        let value = serde_json::to_value(ProjectStats::empty("shop")).unwrap();
        assert_eq!(value["trend"], "stable");
        assert_eq!(value["avg_response_time_seconds"], 0.0);
        assert!(value["last_activity"].is_null());
    }
}
