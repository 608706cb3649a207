//! Offline frame source: WAV file → byte magnitude spectra.
//!
//! Mirrors what a browser analyser node hands the engine at each display
//! tick: Blackman window, forward FFT, magnitude / N, temporal smoothing,
//! then decibels mapped from [min_db, max_db] onto 0..=255.

use std::f32::consts::PI;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use sa_core::SpectrumFrame;

pub const SMOOTHING: f32 = 0.8;
pub const MIN_DB: f32 = -100.0;
pub const MAX_DB: f32 = -30.0;

/// Frames per second of audio, matching a ~60 Hz display refresh.
pub const TICKS_PER_SECOND: f64 = 60.0;

/// Blackman window (a = 0.16) over `size` samples.
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

/// Stateful spectrum analyser; smoothing carries over between blocks.
pub struct ByteAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl ByteAnalyser {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft_size,
            fft: planner.plan_fft_forward(fft_size),
            window: (0..fft_size).map(|i| blackman_window(i, fft_size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Analyse one block of `fft_size` samples (zero-padded when shorter).
    pub fn analyse(&mut self, block: &[f32]) -> Vec<u8> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = block.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let n = self.fft_size as f32;
        let scale = 255.0 / (MAX_DB - MIN_DB);
        self.smoothed
            .iter_mut()
            .zip(&self.buffer)
            .map(|(prev, bin)| {
                *prev = SMOOTHING * *prev + (1.0 - SMOOTHING) * (bin.norm() / n);
                let db = 20.0 * prev.max(f32::MIN_POSITIVE).log10();
                (scale * (db - MIN_DB)).floor().clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

/// Decode a WAV file and mix it down to mono in [-1, 1].
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("{} has no audio channels", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("failed to decode samples")?
        }
    };

    let channels = spec.channels as usize;
    let mono = interleaved
        .chunks(channels)
        .map(|c| c.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

/// Spectrum frames over a decoded signal, one per display tick.
pub struct WavFrames {
    samples: Vec<f32>,
    sample_rate: u32,
    fft_size: usize,
    hop: usize,
    pos: usize,
    analyser: ByteAnalyser,
}

impl WavFrames {
    pub fn new(samples: Vec<f32>, sample_rate: u32, fft_size: usize) -> Self {
        let hop = ((sample_rate as f64 / TICKS_PER_SECOND).round() as usize).max(1);
        Self {
            samples,
            sample_rate,
            fft_size,
            hop,
            pos: 0,
            analyser: ByteAnalyser::new(fft_size),
        }
    }

    pub fn open(path: &Path, fft_size: usize) -> Result<Self> {
        let (samples, rate) = read_wav_mono(path)?;
        tracing::info!(
            "decoded {}: {} samples at {} Hz",
            path.display(),
            samples.len(),
            rate
        );
        Ok(Self::new(samples, rate, fft_size))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Milliseconds of audio between consecutive frames.
    pub fn interval_ms(&self) -> f64 {
        self.hop as f64 * 1000.0 / self.sample_rate as f64
    }
}

impl Iterator for WavFrames {
    type Item = SpectrumFrame;

    fn next(&mut self) -> Option<SpectrumFrame> {
        // A signal shorter than one block still yields one padded frame.
        let last_start = self.samples.len().saturating_sub(self.fft_size);
        if self.pos > last_start {
            return None;
        }
        let end = (self.pos + self.fft_size).min(self.samples.len());
        let magnitudes = self.analyser.analyse(&self.samples[self.pos..end]);
        self.pos += self.hop;
        Some(SpectrumFrame::new(
            magnitudes,
            self.sample_rate as f64,
            self.fft_size,
        ))
    }
}
