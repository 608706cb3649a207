//! Global pitch and consonance via the Harmonic Product Spectrum.
//!
//! The normalized spectrum is multiplied by its own downsampled copies
//! (`spec[i*2]`, `spec[i*3]`, ...). Only a bin whose integer multiples all
//! carry energy survives the product, so the strongest surviving bin in the
//! musical fundamental range is taken as the pitch. Its height, compressed by
//! the `harmonics`-th root, is the consonance (periodicity clarity).

use serde::{Deserialize, Serialize};

use crate::config::HarmonyTuning;
use crate::frame::SpectrumFrame;
use crate::interharmonic::ConsonanceMatrix;

/// Unsmoothed per-frame estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchEstimate {
    pub pitch: f64,
    pub consonance: f64,
}

/// Harmonic product spectrum of a frame: `acc[i] = spec[i] * Π spec[i*h]`
/// for h in 2..=harmonics, skipping orders that fall past the last bin.
pub fn product_spectrum(spectrum: &[f64], harmonics: usize) -> Vec<f64> {
    let mut acc = spectrum.to_vec();
    for h in 2..=harmonics {
        for (i, value) in acc.iter_mut().enumerate() {
            match spectrum.get(i * h) {
                Some(s) => *value *= s,
                None => break,
            }
        }
    }
    acc
}

/// Estimate pitch (Hz, bin centre) and consonance of one frame.
///
/// A silent frame yields pitch 0 and consonance 0.
pub fn estimate(frame: &SpectrumFrame, tuning: &HarmonyTuning) -> PitchEstimate {
    let acc = product_spectrum(&frame.normalized(), tuning.harmonics);
    if acc.is_empty() {
        return PitchEstimate {
            pitch: 0.0,
            consonance: 0.0,
        };
    }

    let lo = frame.index_of(tuning.min_pitch_hz);
    let hi = frame.index_of(tuning.max_pitch_hz).min(acc.len() - 1);

    let mut max_index = 0;
    let mut max_val = 0.0;
    for (i, &v) in acc.iter().enumerate().take(hi + 1).skip(lo) {
        if v > max_val {
            max_val = v;
            max_index = i;
        }
    }

    PitchEstimate {
        pitch: frame.frequency_of(max_index),
        consonance: max_val.powf(1.0 / tuning.harmonics as f64),
    }
}

/// Session-wide harmonic state, replaced wholesale each frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyState {
    /// Smoothed pitch in Hz.
    pub pitch: f64,
    /// Smoothed periodicity strength.
    pub consonance: f64,
    /// Always `1 - consonance`.
    pub tension: f64,
    /// Scaled positive jump in smoothed consonance since the previous frame.
    pub resolution: f64,
    pub inter_channel_consonance: ConsonanceMatrix,
}

impl HarmonyState {
    pub fn new(channel_count: usize) -> Self {
        Self {
            pitch: 0.0,
            consonance: 0.0,
            tension: 1.0,
            resolution: 0.0,
            inter_channel_consonance: ConsonanceMatrix::new(channel_count),
        }
    }

    /// Fold one frame's estimate and pair matrix into the next state.
    ///
    /// Resolution compares the new smoothed consonance with the previous
    /// smoothed value, so only rises register and decays read as 0.
    pub fn advance(
        &self,
        estimate: PitchEstimate,
        matrix: ConsonanceMatrix,
        tuning: &HarmonyTuning,
    ) -> Self {
        let ps = tuning.pitch_smoothing;
        let cs = tuning.consonance_smoothing;
        let pitch = self.pitch * ps + estimate.pitch * (1.0 - ps);
        let consonance = self.consonance * cs + estimate.consonance * (1.0 - cs);
        let rise = (consonance - self.consonance).max(0.0);

        Self {
            pitch,
            consonance,
            tension: 1.0 - consonance,
            resolution: (rise * tuning.resolution_gain).clamp(0.0, 1.0),
            inter_channel_consonance: matrix,
        }
    }
}
