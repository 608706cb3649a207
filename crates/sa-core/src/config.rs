//! Static engine configuration, loaded once per session.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! values it overrides.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::frame::freq_to_index;

/// One monitored frequency band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelDef {
    pub id: u32,
    pub label: String,
    /// Inclusive band edges in Hz.
    pub freq_range: [f64; 2],
}

impl ChannelDef {
    pub fn new(id: u32, label: &str, lo: f64, hi: f64) -> Self {
        Self {
            id,
            label: label.to_string(),
            freq_range: [lo, hi],
        }
    }
}

/// The seven reference bands, sub bass through brilliance.
pub fn reference_channels() -> Vec<ChannelDef> {
    vec![
        ChannelDef::new(1, "Sub Bass", 20.0, 60.0),
        ChannelDef::new(2, "Bass", 60.0, 250.0),
        ChannelDef::new(3, "Low Mids", 250.0, 500.0),
        ChannelDef::new(4, "Midrange", 500.0, 2000.0),
        ChannelDef::new(5, "Upper Mids", 2000.0, 4000.0),
        ChannelDef::new(6, "Presence", 4000.0, 6000.0),
        ChannelDef::new(7, "Brilliance", 6000.0, 20000.0),
    ]
}

/// Per-channel tracking constants (signal, novelty, habituation, attention).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerTuning {
    pub habituation_rate: f64,
    pub habituation_decay: f64,
    pub base_threshold: f64,
    pub threshold_scale: f64,
    pub signal_smoothing: f64,
    pub merit_smoothing: f64,
    pub history_length: usize,
    pub recency_weight: f64,
    pub attention_smoothing: f64,
    pub novelty_gain: f64,
    pub novel_merit: f64,
    pub habituation_novelty_ceiling: f64,
}

impl Default for TrackerTuning {
    fn default() -> Self {
        Self {
            habituation_rate: HABITUATION_RATE,
            habituation_decay: HABITUATION_DECAY,
            base_threshold: BASE_THRESHOLD,
            threshold_scale: THRESHOLD_SCALE,
            signal_smoothing: SIGNAL_SMOOTHING,
            merit_smoothing: MERIT_SMOOTHING,
            history_length: SIGNAL_HISTORY_LENGTH,
            recency_weight: RECENCY_WEIGHT,
            attention_smoothing: ATTENTION_SMOOTHING,
            novelty_gain: NOVELTY_GAIN,
            novel_merit: NOVEL_MERIT,
            habituation_novelty_ceiling: HABITUATION_NOVELTY_CEILING,
        }
    }
}

/// Harmonic product spectrum search and frame smoothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyTuning {
    pub harmonics: usize,
    pub min_pitch_hz: f64,
    pub max_pitch_hz: f64,
    pub pitch_smoothing: f64,
    pub consonance_smoothing: f64,
    pub resolution_gain: f64,
}

impl Default for HarmonyTuning {
    fn default() -> Self {
        Self {
            harmonics: HPS_HARMONICS,
            min_pitch_hz: MIN_PITCH_HZ,
            max_pitch_hz: MAX_PITCH_HZ,
            pitch_smoothing: PITCH_SMOOTHING,
            consonance_smoothing: CONSONANCE_SMOOTHING,
            resolution_gain: RESOLUTION_GAIN,
        }
    }
}

/// Pairwise channel peak comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterharmonicTuning {
    pub peak_floor: u8,
    pub ratio_tolerance: f64,
    pub reference_magnitude: f64,
}

impl Default for InterharmonicTuning {
    fn default() -> Self {
        Self {
            peak_floor: PEAK_FLOOR,
            ratio_tolerance: RATIO_TOLERANCE,
            reference_magnitude: REFERENCE_MAGNITUDE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub fft_size: usize,
    pub tracker: TrackerTuning,
    pub harmony: HarmonyTuning,
    pub interharmonic: InterharmonicTuning,
    pub channels: Vec<ChannelDef>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            fft_size: FFT_SIZE,
            tracker: TrackerTuning::default(),
            harmony: HarmonyTuning::default(),
            interharmonic: InterharmonicTuning::default(),
            channels: reference_channels(),
        }
    }
}

impl EngineConfig {
    /// Number of magnitude bins per frame.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Width of one bin in Hz.
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Index range of a channel's band in this configuration's frames.
    pub fn index_range(&self, def: &ChannelDef) -> (usize, usize) {
        (
            freq_to_index(def.freq_range[0], self.fft_size, self.sample_rate),
            freq_to_index(def.freq_range[1], self.fft_size, self.sample_rate),
        )
    }

    /// Retarget to another sample rate. Band edges above the new Nyquist are
    /// clipped to it and bands starting at or above it are removed. Returns
    /// the removed bands.
    pub fn fit_sample_rate(&mut self, sample_rate: f64) -> Vec<ChannelDef> {
        self.sample_rate = sample_rate;
        let nyquist = sample_rate / 2.0;
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.channels)
            .into_iter()
            .partition(|def| def.freq_range[0] < nyquist);
        self.channels = kept;
        for def in &mut self.channels {
            def.freq_range[1] = def.freq_range[1].min(nyquist);
        }
        dropped
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0 && self.sample_rate.is_finite()) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        let nyquist = self.sample_rate / 2.0;
        let mut seen = HashSet::new();
        for def in &self.channels {
            if !seen.insert(def.id) {
                return Err(ConfigError::DuplicateChannel(def.id));
            }
            let [lo, hi] = def.freq_range;
            if !(lo >= 0.0 && lo < hi && hi <= nyquist) {
                return Err(ConfigError::FrequencyRange {
                    id: def.id,
                    lo,
                    hi,
                    nyquist,
                });
            }
        }

        let t = &self.tracker;
        let h = &self.harmony;
        let factors = [
            ("habituation_rate", t.habituation_rate),
            ("habituation_decay", t.habituation_decay),
            ("signal_smoothing", t.signal_smoothing),
            ("merit_smoothing", t.merit_smoothing),
            ("attention_smoothing", t.attention_smoothing),
            ("pitch_smoothing", h.pitch_smoothing),
            ("consonance_smoothing", h.consonance_smoothing),
        ];
        for (name, value) in factors {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Factor { name, value });
            }
        }
        if t.history_length == 0 {
            return Err(ConfigError::HistoryLength);
        }
        let non_negative = [
            ("base_threshold", t.base_threshold),
            ("threshold_scale", t.threshold_scale),
            ("recency_weight", t.recency_weight),
            ("novelty_gain", t.novelty_gain),
            ("resolution_gain", h.resolution_gain),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Positive { name, value });
            }
        }

        if !(h.min_pitch_hz >= 0.0 && h.min_pitch_hz < h.max_pitch_hz) {
            return Err(ConfigError::PitchRange {
                min: h.min_pitch_hz,
                max: h.max_pitch_hz,
            });
        }
        if h.harmonics == 0 {
            return Err(ConfigError::Harmonics);
        }

        let ih = &self.interharmonic;
        if !(ih.ratio_tolerance > 0.0) {
            return Err(ConfigError::Positive {
                name: "ratio_tolerance",
                value: ih.ratio_tolerance,
            });
        }
        if !(ih.reference_magnitude > 0.0) {
            return Err(ConfigError::Positive {
                name: "reference_magnitude",
                value: ih.reference_magnitude,
            });
        }
        Ok(())
    }
}
