//! Reply latency estimation.
//!
//! Each inbound message searches the outbound messages for a reply addressed
//! back to its sender. Matches are independent: two questions may share one
//! answer.

use chrono::Duration;
use record_core::Message;

/// Which qualifying reply an inbound message is paired with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairingRule {
    /// The earliest reply after the inbound message.
    #[default]
    NearestReply,
    /// The most recent reply after the inbound message.
    LatestReply,
}

impl PairingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NearestReply => "nearest",
            Self::LatestReply => "latest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nearest" => Some(Self::NearestReply),
            "latest" => Some(Self::LatestReply),
            _ => None,
        }
    }
}

/// Result of pairing a project's messages.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseTimeEstimate {
    /// Mean accepted latency in seconds, 0 without pairs.
    pub avg_seconds: f64,
    /// Number of inbound messages with an accepted reply.
    pub pairs: usize,
}

/// Estimate the mean reply latency of a message set.
///
/// A pair is accepted only when `0 < delta < max_gap`; an inbound message
/// whose selected reply falls outside that window is dropped rather than
/// re-paired.
pub fn estimate(messages: &[Message], rule: PairingRule, max_gap: Duration) -> ResponseTimeEstimate {
    let (inbound, mut outbound): (Vec<&Message>, Vec<&Message>) = messages
        .iter()
        .partition(|m| m.is_inbound());

    if inbound.is_empty() || outbound.is_empty() {
        return ResponseTimeEstimate::default();
    }

    match rule {
        PairingRule::NearestReply => outbound.sort_by_key(|m| m.timestamp),
        PairingRule::LatestReply => outbound.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }

    let max_ms = max_gap.num_milliseconds();
    let mut total_ms: i64 = 0;
    let mut pairs = 0usize;

    for question in &inbound {
        let reply = outbound
            .iter()
            .find(|o| o.timestamp > question.timestamp && o.recipient_id == question.sender_id);

        if let Some(reply) = reply {
            let delta = (reply.timestamp - question.timestamp).num_milliseconds();
            if delta > 0 && delta < max_ms {
                total_ms += delta;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        return ResponseTimeEstimate::default();
    }

    ResponseTimeEstimate {
        avg_seconds: total_ms as f64 / pairs as f64 / 1000.0,
        pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap()
    }

    fn inbound(id: &str, secs: i64, visitor: &str) -> Message {
        Message::inbound("shop", id, base() + Duration::seconds(secs), visitor)
    }

    fn outbound(id: &str, secs: i64, visitor: &str) -> Message {
        Message::outbound("shop", id, base() + Duration::seconds(secs), visitor)
    }

    fn gap() -> Duration {
        Duration::seconds(3600)
    }

    #[test]
    fn test_single_pair() {
        let messages = vec![outbound("o1", 40, "alice"), inbound("i1", 0, "alice")];
        let estimate = estimate(&messages, PairingRule::NearestReply, gap());
        assert_eq!(estimate.pairs, 1);
        assert_eq!(estimate.avg_seconds, 40.0);
    }

    #[test]
    fn test_one_sided_sets_yield_zero() {
        let only_inbound = vec![inbound("i1", 0, "alice"), inbound("i2", 10, "bob")];
        assert_eq!(
            estimate(&only_inbound, PairingRule::NearestReply, gap()),
            ResponseTimeEstimate::default()
        );

        let only_outbound = vec![outbound("o1", 0, "alice")];
        assert_eq!(
            estimate(&only_outbound, PairingRule::NearestReply, gap()).avg_seconds,
            0.0
        );

        assert_eq!(estimate(&[], PairingRule::LatestReply, gap()).pairs, 0);
    }

    #[test]
    fn test_reply_must_target_sender() {
        let messages = vec![outbound("o1", 30, "bob"), inbound("i1", 0, "alice")];
        assert_eq!(estimate(&messages, PairingRule::NearestReply, gap()).pairs, 0);
    }

    #[test]
    fn test_reply_must_follow_question() {
        let messages = vec![inbound("i1", 100, "alice"), outbound("o1", 50, "alice")];
        assert_eq!(estimate(&messages, PairingRule::NearestReply, gap()).pairs, 0);

        // Same instant is not a reply
        let messages = vec![inbound("i1", 100, "alice"), outbound("o1", 100, "alice")];
        assert_eq!(estimate(&messages, PairingRule::NearestReply, gap()).pairs, 0);
    }

    #[test]
    fn test_gap_of_an_hour_or_more_is_discarded() {
        let exactly_hour = vec![inbound("i1", 0, "alice"), outbound("o1", 3600, "alice")];
        assert_eq!(estimate(&exactly_hour, PairingRule::NearestReply, gap()).pairs, 0);

        let just_under = vec![inbound("i1", 0, "alice"), outbound("o1", 3599, "alice")];
        let estimate = estimate(&just_under, PairingRule::NearestReply, gap());
        assert_eq!(estimate.pairs, 1);
        assert_eq!(estimate.avg_seconds, 3599.0);
    }

    #[test]
    fn test_pairing_rules_differ() {
        // Newest first, as fetched
        let messages = vec![
            outbound("o2", 600, "alice"),
            outbound("o1", 60, "alice"),
            inbound("i1", 0, "alice"),
        ];

        let nearest = estimate(&messages, PairingRule::NearestReply, gap());
        assert_eq!(nearest.avg_seconds, 60.0);

        let latest = estimate(&messages, PairingRule::LatestReply, gap());
        assert_eq!(latest.avg_seconds, 600.0);
    }

    #[test]
    fn test_latest_reply_out_of_window_drops_pair() {
        let messages = vec![
            outbound("o2", 7200, "alice"),
            outbound("o1", 60, "alice"),
            inbound("i1", 0, "alice"),
        ];

        assert_eq!(estimate(&messages, PairingRule::LatestReply, gap()).pairs, 0);
        assert_eq!(estimate(&messages, PairingRule::NearestReply, gap()).pairs, 1);
    }

    #[test]
    fn test_shared_reply_and_mean() {
        // Two questions answered by one reply, a third answered separately
        let messages = vec![
            inbound("i1", 0, "alice"),
            inbound("i2", 20, "alice"),
            outbound("o1", 30, "alice"),
            inbound("i3", 100, "bob"),
            outbound("o2", 110, "bob"),
        ];

        let estimate = estimate(&messages, PairingRule::NearestReply, gap());
        assert_eq!(estimate.pairs, 3);
        // (30 + 10 + 10) / 3
        assert!((estimate.avg_seconds - 50.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_second_precision() {
        let question = inbound("i1", 0, "alice");
        let mut reply = outbound("o1", 0, "alice");
        reply.timestamp = question.timestamp + Duration::milliseconds(1500);

        let estimate = estimate(&[question, reply], PairingRule::NearestReply, gap());
        assert_eq!(estimate.avg_seconds, 1.5);
    }

    #[test]
    fn test_accepted_average_stays_in_bounds() {
        let mut messages = Vec::new();
        for i in 0..50i64 {
            let visitor = format!("v{}", i % 7);
            messages.push(inbound(&format!("i{}", i), i * 97, &visitor));
            messages.push(outbound(&format!("o{}", i), i * 131 + 5, &visitor));
        }

        for rule in [PairingRule::NearestReply, PairingRule::LatestReply] {
            let estimate = estimate(&messages, rule, gap());
            assert!(estimate.avg_seconds >= 0.0);
            assert!(estimate.avg_seconds < 3600.0);
            if estimate.pairs == 0 {
                assert_eq!(estimate.avg_seconds, 0.0);
            } else {
                assert!(estimate.avg_seconds > 0.0);
            }
        }
    }

    #[test]
    fn test_rule_parsing() {
        assert_eq!(PairingRule::parse("nearest"), Some(PairingRule::NearestReply));
        assert_eq!(PairingRule::parse(" LATEST "), Some(PairingRule::LatestReply));
        assert_eq!(PairingRule::parse("first"), None);
        assert_eq!(PairingRule::LatestReply.as_str(), "latest");
    }
}
