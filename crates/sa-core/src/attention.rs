//! Attention allocation across channels.
//!
//! Each channel scores `merit + seconds_since_novel * recency_weight`. The
//! recency term rewards channels that have gone quiet. Scores are normalized
//! to a distribution and each channel's attention drifts toward its share.

use crate::channel::ChannelState;
use crate::config::TrackerTuning;

/// Raw attention score of one channel at `now_ms`.
pub fn score(channel: &ChannelState, tuning: &TrackerTuning, now_ms: f64) -> f64 {
    channel.merit + channel.seconds_since_novel(now_ms) * tuning.recency_weight
}

/// Normalize scores and smooth every channel's attention toward them.
///
/// Must run after all channels have been updated for the frame. Returns the
/// normalized scores, or `None` when the total score is zero and attention
/// was left untouched.
pub fn allocate(
    channels: &mut [ChannelState],
    tuning: &TrackerTuning,
    now_ms: f64,
) -> Option<Vec<f64>> {
    let scores: Vec<f64> = channels.iter().map(|c| score(c, tuning, now_ms)).collect();
    let total: f64 = scores.iter().sum();

    if !(total > 0.0 && total.is_finite()) {
        tracing::trace!(total, "attention skipped: degenerate score sum");
        return None;
    }

    let normalized: Vec<f64> = scores.iter().map(|s| s / total).collect();
    let alpha = tuning.attention_smoothing;
    for (channel, share) in channels.iter_mut().zip(&normalized) {
        channel.attention = channel.attention * alpha + share * (1.0 - alpha);
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use approx::assert_abs_diff_eq;

    fn channels(config: &EngineConfig, now_ms: f64) -> Vec<ChannelState> {
        config
            .channels
            .iter()
            .map(|d| ChannelState::new(d, config, config.channels.len(), now_ms))
            .collect()
    }

    #[test]
    fn test_zero_sum_leaves_attention_unchanged() {
        let config = EngineConfig::default();
        let mut chans = channels(&config, 5_000.0);
        let before: Vec<f64> = chans.iter().map(|c| c.attention).collect();

        let result = allocate(&mut chans, &config.tracker, 5_000.0);

        assert!(result.is_none());
        let after: Vec<f64> = chans.iter().map(|c| c.attention).collect();
        assert_eq!(before, after);
        assert!(after.iter().all(|a| a.is_finite()));
    }

    #[test]
    fn test_normalized_scores_sum_to_one() {
        let config = EngineConfig::default();
        let mut chans = channels(&config, 0.0);
        for (i, c) in chans.iter_mut().enumerate() {
            c.merit = 0.05 * i as f64;
        }
        let shares = allocate(&mut chans, &config.tracker, 2_000.0).unwrap();
        assert_abs_diff_eq!(shares.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_attention_drifts_toward_share() {
        let config = EngineConfig::default();
        let mut chans = channels(&config, 0.0);
        chans[3].merit = 1.0;

        // At now == last_novel the recency bonus is zero, so channel 3 owns
        // the whole distribution.
        let shares = allocate(&mut chans, &config.tracker, 0.0).unwrap();
        assert_abs_diff_eq!(shares[3], 1.0);

        let uniform = 1.0 / 7.0;
        assert_abs_diff_eq!(chans[3].attention, uniform * 0.9 + 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(chans[0].attention, uniform * 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_recency_bonus_favors_stale_channels() {
        let config = EngineConfig::default();
        let mut chans = channels(&config, 0.0);
        chans[0].last_novel_timestamp = 10_000.0;

        let shares = allocate(&mut chans, &config.tracker, 10_000.0).unwrap();
        assert_eq!(shares[0], 0.0);
        assert!(shares[1] > 0.0);
        assert!(chans[1].attention > chans[0].attention);
    }
}
