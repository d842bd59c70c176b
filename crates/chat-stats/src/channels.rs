//! Per-channel message tally.

use record_core::Message;

use crate::models::ChannelCount;

/// Count messages per channel, busiest first.
///
/// Channels with equal counts keep the order they were first seen in.
pub fn breakdown(messages: &[Message]) -> Vec<ChannelCount> {
    let mut counts: Vec<ChannelCount> = Vec::new();

    for message in messages {
        match counts.iter_mut().find(|c| c.channel == message.channel) {
            Some(entry) => entry.count += 1,
            None => counts.push(ChannelCount {
                channel: message.channel,
                count: 1,
            }),
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use record_core::Channel;

    fn messages(channels: &[Channel]) -> Vec<Message> {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        channels
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                Message::inbound("shop", format!("m{}", i), start + Duration::minutes(i as i64), "v")
                    .on(*channel)
            })
            .collect()
    }

    #[test]
    fn test_sorted_descending() {
        let set = messages(&[
            Channel::Web,
            Channel::Whatsapp,
            Channel::Whatsapp,
            Channel::Instagram,
            Channel::Whatsapp,
            Channel::Web,
        ]);

        let result = breakdown(&set);
        assert_eq!(
            result,
            vec![
                ChannelCount { channel: Channel::Whatsapp, count: 3 },
                ChannelCount { channel: Channel::Web, count: 2 },
                ChannelCount { channel: Channel::Instagram, count: 1 },
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let set = messages(&[
            Channel::Facebook,
            Channel::Other,
            Channel::Web,
            Channel::Other,
            Channel::Facebook,
            Channel::Web,
        ]);

        let order: Vec<Channel> = breakdown(&set).into_iter().map(|c| c.channel).collect();
        assert_eq!(order, vec![Channel::Facebook, Channel::Other, Channel::Web]);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let pattern = [
            Channel::Web,
            Channel::Whatsapp,
            Channel::Facebook,
            Channel::Instagram,
            Channel::Other,
        ];
        for len in [0usize, 1, 7, 64, 500] {
            let channels: Vec<Channel> = (0..len).map(|i| pattern[(i * i + 3) % 5]).collect();
            let result = breakdown(&messages(&channels));

            let sum: u64 = result.iter().map(|c| c.count).sum();
            assert_eq!(sum, len as u64);
            assert!(result.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }
}
