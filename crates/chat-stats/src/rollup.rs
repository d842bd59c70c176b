//! Global rollup across projects.

use crate::models::{GlobalStats, ProjectStats};

impl GlobalStats {
    /// Fold per-project statistics into one summary.
    ///
    /// Projects without any paired reply are left out of the response time
    /// average instead of counting as instant replies.
    pub fn fold<'a>(projects: impl IntoIterator<Item = &'a ProjectStats>) -> Self {
        let mut global = GlobalStats::default();
        let mut response_sum = 0.0;
        let mut responding = 0u64;

        for stats in projects {
            global.total_active_chats += stats.active_conversations;
            global.total_messages_24h += stats.messages_24h;
            global.total_leads += stats.total_leads;
            if stats.has_activity() {
                global.projects_with_activity += 1;
            }
            if stats.avg_response_time_seconds > 0.0 {
                response_sum += stats.avg_response_time_seconds;
                responding += 1;
            }
        }

        if responding > 0 {
            global.avg_response_time_seconds = response_sum / responding as f64;
        }
        global
    }
}
