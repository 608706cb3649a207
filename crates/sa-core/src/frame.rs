use serde::{Deserialize, Serialize};

use crate::constants::MAX_MAGNITUDE;

/// Nearest bin index for a frequency: round(freq / nyquist * bins).
pub fn freq_to_index(freq: f64, fft_size: usize, sample_rate: f64) -> usize {
    let idx = (freq / (sample_rate / 2.0) * (fft_size / 2) as f64).round();
    if idx <= 0.0 { 0 } else { idx as usize }
}

/// One read-only magnitude snapshot from the audio-input collaborator.
///
/// `magnitudes` holds `fft_size / 2` byte samples (0..=255), bin `i`
/// centred on `i * sample_rate / fft_size` Hz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumFrame {
    pub sample_rate: f64,
    pub fft_size: usize,
    pub magnitudes: Vec<u8>,
}

impl SpectrumFrame {
    pub fn new(magnitudes: Vec<u8>, sample_rate: f64, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
            magnitudes,
        }
    }

    /// All-zero frame of the right length.
    pub fn silent(sample_rate: f64, fft_size: usize) -> Self {
        Self::new(vec![0; fft_size / 2], sample_rate, fft_size)
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    pub fn index_of(&self, freq: f64) -> usize {
        freq_to_index(freq, self.fft_size, self.sample_rate)
    }

    pub fn frequency_of(&self, index: usize) -> f64 {
        index as f64 * self.bin_width()
    }

    /// Samples in `start..=end`, clipped to the frame. Empty when the range
    /// is inverted or lies past the last bin.
    pub fn slice(&self, (start, end): (usize, usize)) -> &[u8] {
        if start > end || start >= self.magnitudes.len() {
            return &[];
        }
        let end = end.min(self.magnitudes.len() - 1);
        &self.magnitudes[start..=end]
    }

    /// Whole spectrum scaled to 0..1.
    pub fn normalized(&self) -> Vec<f64> {
        self.magnitudes
            .iter()
            .map(|&m| m as f64 / MAX_MAGNITUDE)
            .collect()
    }

    /// Mean of a slice scaled to 0..1; 0 for an empty range.
    pub fn mean_level(&self, range: (usize, usize)) -> f64 {
        let slice = self.slice(range);
        if slice.is_empty() {
            return 0.0;
        }
        let sum: u64 = slice.iter().map(|&m| m as u64).sum();
        sum as f64 / slice.len() as f64 / MAX_MAGNITUDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freq_to_index_rounds() {
        assert_eq!(freq_to_index(220.0, 4096, 44100.0), 20);
        assert_eq!(freq_to_index(0.0, 4096, 44100.0), 0);
        assert_eq!(freq_to_index(22050.0, 4096, 44100.0), 2048);
    }

    #[test]
    fn test_slice_is_inclusive_and_clipped() {
        let frame = SpectrumFrame::new((0..8).collect(), 16.0, 16);
        assert_eq!(frame.slice((2, 4)), &[2, 3, 4]);
        assert_eq!(frame.slice((6, 20)), &[6, 7]);
        assert!(frame.slice((9, 12)).is_empty());
        assert!(frame.slice((4, 2)).is_empty());
    }

    #[test]
    fn test_mean_level() {
        let frame = SpectrumFrame::new(vec![255, 255, 0, 0], 8.0, 8);
        assert!((frame.mean_level((0, 1)) - 1.0).abs() < 1e-12);
        assert!((frame.mean_level((0, 3)) - 0.5).abs() < 1e-12);
        assert_eq!(frame.mean_level((5, 6)), 0.0);
    }

    #[test]
    fn test_frequency_of_matches_bin_width() {
        let frame = SpectrumFrame::silent(44100.0, 4096);
        assert_eq!(frame.len(), 2048);
        assert!((frame.frequency_of(20) - 215.332_031_25).abs() < 1e-6);
    }
}
