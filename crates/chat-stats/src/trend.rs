//! Period-over-period trend.

use chrono::{DateTime, Duration, Utc};
use record_core::Message;

use crate::models::Trend;

/// Trend of a message set split at the middle of its window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendResult {
    pub trend: Trend,
    /// Absolute percent change, never negative.
    pub percentage: f64,
    /// Messages in the newer half of the window.
    pub recent: u64,
    /// Messages in the older half of the window.
    pub prior: u64,
}

/// Compare the newer half of `window` against the older half.
///
/// `messages` is assumed to already be limited to the window ending at
/// `now`; everything before the midpoint counts as the prior period.
pub fn calculate(
    messages: &[Message],
    now: DateTime<Utc>,
    window: Duration,
    threshold_percent: f64,
) -> TrendResult {
    let midpoint = now - window / 2;
    let recent = messages.iter().filter(|m| m.timestamp >= midpoint).count() as u64;
    let prior = messages.len() as u64 - recent;
    from_counts(recent, prior, threshold_percent)
}

/// Derive the trend from period counts.
///
/// With no prior activity there is no baseline and the trend is stable at 0%.
pub fn from_counts(recent: u64, prior: u64, threshold_percent: f64) -> TrendResult {
    if prior == 0 {
        return TrendResult {
            trend: Trend::Stable,
            percentage: 0.0,
            recent,
            prior,
        };
    }

    let change = (recent as f64 - prior as f64) * 100.0 / prior as f64;
    let trend = if change > threshold_percent {
        Trend::Up
    } else if change < -threshold_percent {
        Trend::Down
    } else {
        Trend::Stable
    };

    TrendResult {
        trend,
        percentage: change.abs(),
        recent,
        prior,
    }
}
