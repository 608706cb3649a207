//! Synthetic harmonic frames for demos and pipeline tests.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sa_core::{EngineConfig, SpectrumFrame};

pub struct SynthParams {
    pub fundamental: f64,
    pub harmonics: usize,
    pub magnitude: u8,
    pub noise: u8,
    /// Toggle the tone on/off every `pulse` frames; 0 holds it steady.
    pub pulse: usize,
    pub seed: u64,
}

/// Frame `k` of the synthetic stream: an optional noise floor plus a
/// harmonic series at exact integer multiples of the fundamental's bin.
pub fn frame(
    config: &EngineConfig,
    params: &SynthParams,
    k: usize,
    rng: &mut impl Rng,
) -> SpectrumFrame {
    let mut frame = SpectrumFrame::silent(config.sample_rate, config.fft_size);
    if params.noise > 0 {
        for m in &mut frame.magnitudes {
            *m = rng.random_range(0..=params.noise);
        }
    }

    let sounding = params.pulse == 0 || (k / params.pulse) % 2 == 0;
    let f0 = frame.index_of(params.fundamental);
    if sounding && f0 > 0 {
        for h in 1..=params.harmonics {
            if let Some(m) = frame.magnitudes.get_mut(f0 * h) {
                *m = (*m).max(params.magnitude);
            }
        }
    }
    frame
}

/// `count` frames from a seeded generator.
pub fn frames(config: &EngineConfig, params: &SynthParams, count: usize) -> Vec<SpectrumFrame> {
    let mut rng = SmallRng::seed_from_u64(params.seed);
    (0..count).map(|k| frame(config, params, k, &mut rng)).collect()
}
