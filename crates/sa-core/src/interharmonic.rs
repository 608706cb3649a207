//! Pairwise consonance between channel peaks.
//!
//! Each channel contributes its loudest bin. For every pair of significant
//! peaks the frequency ratio is folded into one octave and compared with a
//! small table of just-intonation intervals; closeness to the nearest
//! interval, weighted by the weaker peak, is the pair's score.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelState;
use crate::config::InterharmonicTuning;
use crate::constants::CONSONANT_RATIOS;
use crate::error::MatrixShapeError;
use crate::frame::SpectrumFrame;

/// Square symmetric matrix indexed by channel position. The diagonal is
/// never written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct ConsonanceMatrix {
    size: usize,
    values: Vec<f64>,
}

/// Unchecked wire form; `values.len()` must equal `size * size`.
#[derive(Deserialize)]
struct RawMatrix {
    size: usize,
    values: Vec<f64>,
}

impl TryFrom<RawMatrix> for ConsonanceMatrix {
    type Error = MatrixShapeError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        if raw.size.checked_mul(raw.size) != Some(raw.values.len()) {
            return Err(MatrixShapeError {
                size: raw.size,
                len: raw.values.len(),
            });
        }
        Ok(Self {
            size: raw.size,
            values: raw.values,
        })
    }
}

impl ConsonanceMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Write `score` at both [i][j] and [j][i].
    fn set_pair(&mut self, i: usize, j: usize, score: f64) {
        self.values[i * self.size + j] = score;
        self.values[j * self.size + i] = score;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size.max(1)).take(self.size)
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Dominant bin of one channel; frequency and magnitude are 0 when the peak
/// is below the significance floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub frequency: f64,
    pub magnitude: f64,
}

impl Peak {
    const NONE: Peak = Peak {
        frequency: 0.0,
        magnitude: 0.0,
    };

    pub fn is_significant(&self) -> bool {
        self.frequency != 0.0
    }
}

/// Loudest sample in `range` (first maximum wins).
pub fn find_peak(frame: &SpectrumFrame, range: (usize, usize), floor: u8) -> Peak {
    let slice = frame.slice(range);
    let mut best: Option<(usize, u8)> = None;
    for (offset, &m) in slice.iter().enumerate() {
        if best.is_none_or(|(_, b)| m > b) {
            best = Some((offset, m));
        }
    }

    match best {
        Some((offset, m)) if m >= floor => Peak {
            frequency: frame.frequency_of(range.0 + offset),
            magnitude: m as f64,
        },
        _ => Peak::NONE,
    }
}

/// Fold a ratio into [1, 2).
pub fn octave_reduce(mut ratio: f64) -> f64 {
    if !(ratio.is_finite() && ratio > 0.0) {
        return ratio;
    }
    while ratio >= 2.0 {
        ratio /= 2.0;
    }
    while ratio < 1.0 {
        ratio *= 2.0;
    }
    ratio
}

/// Closeness (0..1) of two frequencies to a consonant interval, ignoring
/// magnitude. Linear falloff to 0 at `tolerance` from the nearest ratio.
pub fn ratio_score(f1: f64, f2: f64, tolerance: f64) -> f64 {
    let (hi, lo) = if f1 >= f2 { (f1, f2) } else { (f2, f1) };
    let reduced = octave_reduce(hi / lo);
    let distance = CONSONANT_RATIOS
        .iter()
        .map(|r| (reduced - r).abs())
        .fold(f64::INFINITY, f64::min);
    (1.0 - distance / tolerance).max(0.0)
}

/// Pair score for two significant peaks. The magnitude weight is not capped
/// at 1, so peaks louder than the reference magnitude amplify the score.
pub fn pair_score(a: Peak, b: Peak, tuning: &InterharmonicTuning) -> f64 {
    let raw = ratio_score(a.frequency, b.frequency, tuning.ratio_tolerance);
    let weight = (a.magnitude / tuning.reference_magnitude)
        .min(b.magnitude / tuning.reference_magnitude);
    raw * weight
}

/// Full pairwise matrix for the current frame. Holds no state between frames.
pub fn analyze(
    frame: &SpectrumFrame,
    channels: &[ChannelState],
    tuning: &InterharmonicTuning,
) -> ConsonanceMatrix {
    let peaks: Vec<Peak> = channels
        .iter()
        .map(|c| find_peak(frame, c.index_range, tuning.peak_floor))
        .collect();

    let mut matrix = ConsonanceMatrix::new(channels.len());
    for i in 0..peaks.len() {
        if !peaks[i].is_significant() {
            continue;
        }
        for j in (i + 1)..peaks.len() {
            if peaks[j].is_significant() {
                matrix.set_pair(i, j, pair_score(peaks[i], peaks[j], tuning));
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use approx::assert_abs_diff_eq;

    fn setup() -> (EngineConfig, Vec<ChannelState>) {
        let config = EngineConfig::default();
        let channels = config
            .channels
            .iter()
            .map(|d| ChannelState::new(d, &config, config.channels.len(), 0.0))
            .collect();
        (config, channels)
    }

    #[test]
    fn test_octave_reduce() {
        assert_abs_diff_eq!(octave_reduce(3.0), 1.5);
        assert_abs_diff_eq!(octave_reduce(6.0), 1.5);
        assert_abs_diff_eq!(octave_reduce(0.75), 1.5);
        assert_abs_diff_eq!(octave_reduce(2.0), 1.0);
        assert_abs_diff_eq!(octave_reduce(1.0), 1.0);
    }

    #[test]
    fn test_ratio_score_falloff() {
        assert_abs_diff_eq!(ratio_score(300.0, 200.0, 0.05), 1.0);
        assert_abs_diff_eq!(ratio_score(200.0, 300.0, 0.05), 1.0);
        // 1.525 is halfway to the tolerance edge from 3/2
        assert_abs_diff_eq!(ratio_score(152.5, 100.0, 0.05), 0.5, epsilon = 1e-9);
        assert_eq!(ratio_score(2.0_f64.sqrt(), 1.0, 0.05), 0.0);
        // Unison is not in the table
        assert_eq!(ratio_score(100.0, 100.0, 0.05), 0.0);
    }

    #[test]
    fn test_find_peak_below_floor_is_insignificant() {
        let (config, channels) = setup();
        let mut frame = SpectrumFrame::silent(config.sample_rate, config.fft_size);
        frame.magnitudes[10] = 19;
        let peak = find_peak(&frame, channels[1].index_range, 20);
        assert!(!peak.is_significant());
        assert_eq!(peak.magnitude, 0.0);

        frame.magnitudes[12] = 20;
        let peak = find_peak(&frame, channels[1].index_range, 20);
        assert_abs_diff_eq!(peak.frequency, frame.frequency_of(12));
        assert_eq!(peak.magnitude, 20.0);
    }

    #[test]
    fn test_fifth_between_channels_scores_weight() {
        let (config, channels) = setup();
        let mut frame = SpectrumFrame::silent(config.sample_rate, config.fft_size);
        // Bass bin 20, Low Mids bin 30: exact 3:2
        frame.magnitudes[20] = 200;
        frame.magnitudes[30] = 200;

        let m = analyze(&frame, &channels, &config.interharmonic);
        let weight = 200.0 / 128.0;
        assert_abs_diff_eq!(m.get(1, 2), weight, epsilon = 1e-12);
        assert_eq!(m.get(1, 2), m.get(2, 1));
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_dissonant_pair_scores_zero() {
        let (config, channels) = setup();
        let mut frame = SpectrumFrame::silent(config.sample_rate, config.fft_size);
        // 24 / 17 ≈ 1.412, far from every table entry
        frame.magnitudes[17] = 255;
        frame.magnitudes[24] = 255;
        let m = analyze(&frame, &channels, &config.interharmonic);
        assert_eq!(m.get(1, 2), 0.0);
    }

    #[test]
    fn test_weight_uses_weaker_peak() {
        let tuning = InterharmonicTuning::default();
        let a = Peak {
            frequency: 200.0,
            magnitude: 255.0,
        };
        let b = Peak {
            frequency: 300.0,
            magnitude: 64.0,
        };
        assert_abs_diff_eq!(pair_score(a, b, &tuning), 0.5);
    }

    #[test]
    fn test_matrix_deserialize_checks_shape() {
        let ok: ConsonanceMatrix =
            serde_json::from_str(r#"{"size": 2, "values": [0.0, 0.5, 0.5, 0.0]}"#).unwrap();
        assert_eq!(ok.get(0, 1), 0.5);

        let err = serde_json::from_str::<ConsonanceMatrix>(r#"{"size": 7, "values": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("needs 49 values, got 0"));
    }

    #[test]
    fn test_rows_cover_matrix() {
        let m = ConsonanceMatrix::new(3);
        assert_eq!(m.rows().count(), 3);
        assert!(m.rows().all(|r| r.len() == 3));
        assert_eq!(m.row(2), &[0.0, 0.0, 0.0]);
        assert_eq!(ConsonanceMatrix::new(0).rows().count(), 0);
    }
}
