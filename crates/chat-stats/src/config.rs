//! Configuration for the statistics engine.

use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::error::StatsError;
use crate::response_time::PairingRule;

/// Default number of projects aggregated at the same time.
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Longest accepted message window.
const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Tunables for one aggregation engine.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Maximum number of project pipelines running at once.
    pub max_concurrent_projects: usize,

    /// Cap on active/pending conversations fetched per project.
    pub active_conversation_limit: usize,

    /// Cap on messages fetched per project.
    pub message_limit: usize,

    /// Cap on conversations fetched per project when counting leads.
    pub conversation_limit: usize,

    /// Trailing window messages are fetched over.
    pub lookback: Duration,

    /// Window for the "last 24 hours" message count.
    pub recent_window: Duration,

    /// Replies slower than this are not counted as responses.
    pub max_response_gap: Duration,

    /// Percent change needed before a trend is reported as up or down.
    pub trend_threshold_percent: f64,

    /// How an inbound message picks its reply.
    pub pairing_rule: PairingRule,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_projects: DEFAULT_MAX_CONCURRENCY,
            active_conversation_limit: 100,
            message_limit: 500,
            conversation_limit: 1000,
            lookback: Duration::days(7),
            recent_window: Duration::hours(24),
            max_response_gap: Duration::seconds(3600),
            trend_threshold_percent: 5.0,
            pairing_rule: PairingRule::default(),
        }
    }
}

impl StatsConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `STATS_MAX_CONCURRENCY` - Concurrent project pipelines (default: 8)
    /// - `STATS_ACTIVE_LIMIT` - Active conversations fetched (default: 100)
    /// - `STATS_MESSAGE_LIMIT` - Messages fetched (default: 500)
    /// - `STATS_CONVERSATION_LIMIT` - Conversations fetched for leads (default: 1000)
    /// - `STATS_LOOKBACK_DAYS` - Message window in days (default: 7)
    /// - `STATS_MAX_RESPONSE_SECS` - Longest counted reply gap (default: 3600)
    /// - `STATS_TREND_THRESHOLD` - Trend threshold in percent (default: 5.0)
    /// - `STATS_PAIRING_RULE` - `nearest` or `latest` (default: nearest)
    pub fn from_env() -> Result<Self, StatsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StatsError> {
        let defaults = Self::default();

        let pairing_rule = match lookup("STATS_PAIRING_RULE") {
            Some(value) => PairingRule::parse(&value).ok_or_else(|| {
                StatsError::Configuration(format!("unknown STATS_PAIRING_RULE: {}", value))
            })?,
            None => defaults.pairing_rule,
        };

        let lookback = match parse_var::<i64>(&lookup, "STATS_LOOKBACK_DAYS")? {
            Some(days) => Duration::try_days(days)
                .ok_or_else(|| out_of_range("STATS_LOOKBACK_DAYS", days))?,
            None => defaults.lookback,
        };

        let max_response_gap = match parse_var::<i64>(&lookup, "STATS_MAX_RESPONSE_SECS")? {
            Some(secs) => Duration::try_seconds(secs)
                .ok_or_else(|| out_of_range("STATS_MAX_RESPONSE_SECS", secs))?,
            None => defaults.max_response_gap,
        };

        let config = Self {
            max_concurrent_projects: parse_var(&lookup, "STATS_MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrent_projects),
            active_conversation_limit: parse_var(&lookup, "STATS_ACTIVE_LIMIT")?
                .unwrap_or(defaults.active_conversation_limit),
            message_limit: parse_var(&lookup, "STATS_MESSAGE_LIMIT")?
                .unwrap_or(defaults.message_limit),
            conversation_limit: parse_var(&lookup, "STATS_CONVERSATION_LIMIT")?
                .unwrap_or(defaults.conversation_limit),
            lookback,
            recent_window: defaults.recent_window,
            max_response_gap,
            trend_threshold_percent: parse_var(&lookup, "STATS_TREND_THRESHOLD")?
                .unwrap_or(defaults.trend_threshold_percent),
            pairing_rule,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.max_concurrent_projects == 0 {
            return Err(StatsError::Configuration(
                "max_concurrent_projects must be at least 1".to_string(),
            ));
        }
        if self.lookback <= Duration::zero() {
            return Err(StatsError::Configuration(
                "lookback must be positive".to_string(),
            ));
        }
        if self.lookback.num_days() > MAX_LOOKBACK_DAYS {
            return Err(StatsError::Configuration(format!(
                "lookback must be at most {} days",
                MAX_LOOKBACK_DAYS
            )));
        }
        if self.max_response_gap <= Duration::zero() {
            return Err(StatsError::Configuration(
                "max_response_gap must be positive".to_string(),
            ));
        }
        if self.trend_threshold_percent.is_nan() || self.trend_threshold_percent < 0.0 {
            return Err(StatsError::Configuration(
                "trend_threshold_percent must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder-style override for the concurrency cap.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrent_projects = max;
        self
    }

    /// Builder-style override for the pairing rule.
    pub fn with_pairing_rule(mut self, rule: PairingRule) -> Self {
        self.pairing_rule = rule;
        self
    }
}

/// Read and parse one variable. Unset is `None`; unparseable is an error.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, StatsError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StatsError::Configuration(format!("invalid {}: {:?}", key, raw))),
        None => Ok(None),
    }
}

fn out_of_range(key: &str, value: i64) -> StatsError {
    StatsError::Configuration(format!("{} out of range: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<StatsConfig, StatsError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StatsConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_from_vars() {
        let config = from_vars(&[
            ("STATS_MAX_CONCURRENCY", "3"),
            ("STATS_LOOKBACK_DAYS", " 14 "),
            ("STATS_MAX_RESPONSE_SECS", "600"),
            ("STATS_TREND_THRESHOLD", "2.5"),
            ("STATS_PAIRING_RULE", "latest"),
        ])
        .unwrap();

        assert_eq!(config.max_concurrent_projects, 3);
        assert_eq!(config.lookback, Duration::days(14));
        assert_eq!(config.max_response_gap, Duration::seconds(600));
        assert_eq!(config.trend_threshold_percent, 2.5);
        assert_eq!(config.pairing_rule, PairingRule::LatestReply);
        assert_eq!(config.message_limit, 500);

        let config = from_vars(&[]).unwrap();
        assert_eq!(config.lookback, Duration::days(7));
    }

    #[test]
    fn test_out_of_range_durations_are_errors() {
        for vars in [
            [("STATS_LOOKBACK_DAYS", "999999999999999")],
            [("STATS_LOOKBACK_DAYS", "5000")],
            [("STATS_MAX_RESPONSE_SECS", "9223372036854775807")],
            [("STATS_LOOKBACK_DAYS", "0")],
        ] {
            assert!(
                matches!(from_vars(&vars), Err(StatsError::Configuration(_))),
                "{:?} should be rejected",
                vars
            );
        }
    }

    #[test]
    fn test_unparseable_values_are_errors() {
        assert!(from_vars(&[("STATS_MESSAGE_LIMIT", "lots")]).is_err());
        assert!(from_vars(&[("STATS_PAIRING_RULE", "fastest")]).is_err());
        assert!(from_vars(&[("STATS_TREND_THRESHOLD", "-1")]).is_err());
    }

    #[test]
    fn test_validate_accepts_max_lookback() {
        let config = StatsConfig {
            lookback: Duration::days(MAX_LOOKBACK_DAYS),
            ..StatsConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = StatsConfig::default();
        assert_eq!(config.max_concurrent_projects, 8);
        assert_eq!(config.active_conversation_limit, 100);
        assert_eq!(config.message_limit, 500);
        assert_eq!(config.conversation_limit, 1000);
        assert_eq!(config.lookback, Duration::days(7));
        assert_eq!(config.max_response_gap, Duration::seconds(3600));
        assert_eq!(config.pairing_rule, PairingRule::NearestReply);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = StatsConfig::default().with_max_concurrency(0);
        assert!(matches!(
            config.validate(),
            Err(StatsError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = StatsConfig {
            trend_threshold_percent: -1.0,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StatsConfig {
            trend_threshold_percent: f64::NAN,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
