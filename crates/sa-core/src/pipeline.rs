use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attention::allocate;
use crate::channel::ChannelState;
use crate::config::EngineConfig;
use crate::frame::SpectrumFrame;
use crate::harmony::{HarmonyState, estimate};
use crate::interharmonic::analyze;

/// Everything the engine knows after one frame. Produced fresh each frame
/// and never fed back in by consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session_id: Uuid,
    /// Frames processed since the session (re)started.
    pub frame: u64,
    /// Clock reading (ms) when the snapshot was produced.
    pub timestamp: f64,
    pub channels: Vec<ChannelState>,
    pub harmony: HarmonyState,
}

impl Snapshot {
    /// Documented initial state for a fresh session.
    pub fn initial(config: &EngineConfig, session_id: Uuid, now_ms: f64) -> Self {
        let count = config.channels.len();
        Self {
            session_id,
            frame: 0,
            timestamp: now_ms,
            channels: config
                .channels
                .iter()
                .map(|def| ChannelState::new(def, config, count, now_ms))
                .collect(),
            harmony: HarmonyState::new(count),
        }
    }

    pub fn channel(&self, id: u32) -> Option<&ChannelState> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn active_channels(&self) -> impl Iterator<Item = &ChannelState> {
        self.channels.iter().filter(|c| c.is_active)
    }

    /// Channel holding the largest attention share.
    pub fn focus(&self) -> Option<&ChannelState> {
        self.channels
            .iter()
            .max_by(|a, b| a.attention.total_cmp(&b.attention))
    }
}

/// One analysis pass: previous snapshot plus a new frame gives the next
/// snapshot. The frame must match `config`'s geometry.
///
/// Order: per-channel tracking, then attention (needs every channel's merit),
/// then the frame-wide harmony and interharmonic passes.
pub fn reduce(
    prev: &Snapshot,
    frame: &SpectrumFrame,
    config: &EngineConfig,
    now_ms: f64,
) -> Snapshot {
    let mut channels = prev.channels.clone();
    for channel in &mut channels {
        channel.update(frame, &config.tracker, now_ms);
    }
    allocate(&mut channels, &config.tracker, now_ms);

    let pitch = estimate(frame, &config.harmony);
    let matrix = analyze(frame, &channels, &config.interharmonic);
    let harmony = prev.harmony.advance(pitch, matrix, &config.harmony);

    Snapshot {
        session_id: prev.session_id,
        frame: prev.frame + 1,
        timestamp: now_ms,
        channels,
        harmony,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let config = EngineConfig::default();
        let snap = Snapshot::initial(&config, Uuid::nil(), 0.0);
        assert_eq!(snap.channels.len(), 7);
        assert_eq!(snap.frame, 0);
        assert_eq!(snap.harmony.tension, 1.0);
        assert_eq!(snap.harmony.inter_channel_consonance.size(), 7);
        assert_eq!(snap.channel(4).map(|c| c.label.as_str()), Some("Midrange"));
        assert_eq!(snap.active_channels().count(), 0);
    }

    #[test]
    fn test_reduce_does_not_touch_previous() {
        let config = EngineConfig::default();
        let prev = Snapshot::initial(&config, Uuid::nil(), 0.0);
        let frame = SpectrumFrame::new(vec![200; 2048], config.sample_rate, config.fft_size);

        let next = reduce(&prev, &frame, &config, 16.0);

        assert_eq!(prev, Snapshot::initial(&config, Uuid::nil(), 0.0));
        assert_eq!(next.frame, 1);
        assert_eq!(next.timestamp, 16.0);
        assert!(next.channels.iter().all(|c| c.current_signal > 0.0));
    }

    #[test]
    fn test_focus_follows_attention() {
        let config = EngineConfig::default();
        let mut snap = Snapshot::initial(&config, Uuid::nil(), 0.0);
        snap.channels[5].attention = 0.9;
        assert_eq!(snap.focus().map(|c| c.id), Some(6));
    }
}
