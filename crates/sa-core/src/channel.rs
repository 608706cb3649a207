use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{ChannelDef, EngineConfig, TrackerTuning};
use crate::frame::SpectrumFrame;

/// Live state of one monitored frequency band.
///
/// Identity and `index_range` are fixed at creation; everything else is
/// rewritten exactly once per frame by [`ChannelState::update`] and
/// [`crate::attention::allocate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    pub id: u32,
    pub label: String,
    pub freq_range: [f64; 2],
    /// Inclusive bin range into the frame.
    pub index_range: (usize, usize),

    /// Smoothed loudness (0..1).
    pub current_signal: f64,
    /// Last `history_length` values of `current_signal`, oldest first.
    pub signal_history: VecDeque<f64>,
    /// Novelty computed on the latest frame.
    pub novelty: f64,

    /// "Boredom" (0..1).
    pub habituation: f64,
    pub threshold: f64,

    /// Smoothed novelty (interest).
    pub merit: f64,
    /// Milliseconds since the Unix epoch.
    pub last_novel_timestamp: f64,

    pub attention: f64,
    pub is_active: bool,
}

impl ChannelState {
    /// Initial state: silent, unhabituated, history zero-filled, attention
    /// shared uniformly across `channel_count` channels.
    pub fn new(def: &ChannelDef, config: &EngineConfig, channel_count: usize, now_ms: f64) -> Self {
        let tuning = &config.tracker;
        Self {
            id: def.id,
            label: def.label.clone(),
            freq_range: def.freq_range,
            index_range: config.index_range(def),
            current_signal: 0.0,
            signal_history: VecDeque::from(vec![0.0; tuning.history_length]),
            novelty: 0.0,
            habituation: 0.0,
            threshold: tuning.base_threshold,
            merit: 0.0,
            last_novel_timestamp: now_ms,
            attention: 1.0 / channel_count as f64,
            is_active: false,
        }
    }

    /// Advance this channel by one frame.
    pub fn update(&mut self, frame: &SpectrumFrame, tuning: &TrackerTuning, now_ms: f64) {
        let raw = frame.mean_level(self.index_range);
        self.current_signal =
            self.current_signal * tuning.signal_smoothing + raw * (1.0 - tuning.signal_smoothing);

        self.signal_history.push_back(self.current_signal);
        while self.signal_history.len() > tuning.history_length {
            self.signal_history.pop_front();
        }

        // Cold-start zeros stay in the buffer, so novelty reads low until
        // the history has been filled with real signal.
        self.novelty =
            population_stddev(self.signal_history.make_contiguous()) * tuning.novelty_gain;
        self.merit =
            self.merit * tuning.merit_smoothing + self.novelty * (1.0 - tuning.merit_smoothing);

        if self.merit > tuning.novel_merit {
            self.last_novel_timestamp = now_ms;
        }

        // Compared against the previous frame's threshold.
        if self.current_signal > self.threshold && self.novelty < tuning.habituation_novelty_ceiling
        {
            self.habituation = (self.habituation + tuning.habituation_rate).min(1.0);
        } else {
            self.habituation *= tuning.habituation_decay;
        }
        self.threshold = tuning.base_threshold + self.habituation * tuning.threshold_scale;

        self.is_active = self.current_signal > self.threshold;
    }

    /// Seconds since this channel last produced a merit spike.
    pub fn seconds_since_novel(&self, now_ms: f64) -> f64 {
        (now_ms - self.last_novel_timestamp) / 1000.0
    }
}

/// Population standard deviation (divides by N).
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
