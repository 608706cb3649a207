/// How quickly a channel gets "bored" per frame of sustained, unchanging signal
pub const HABITUATION_RATE: f64 = 0.005;

/// Per-frame decay factor applied to habituation when not reinforced
pub const HABITUATION_DECAY: f64 = 0.99;

/// Minimum smoothed signal needed to activate a channel
pub const BASE_THRESHOLD: f64 = 0.15;

/// How much habituation raises the activation threshold
pub const THRESHOLD_SCALE: f64 = 0.8;

/// EMA factor for the incoming band loudness
pub const SIGNAL_SMOOTHING: f64 = 0.7;

/// EMA factor for merit (reacts slowly)
pub const MERIT_SMOOTHING: f64 = 0.95;

/// Frames of signal history used for novelty
pub const SIGNAL_HISTORY_LENGTH: usize = 30;

/// Attention score bonus per second since a channel was last novel
pub const RECENCY_WEIGHT: f64 = 0.05;

/// EMA factor for attention shifts
pub const ATTENTION_SMOOTHING: f64 = 0.9;

/// Multiplier from signal-history standard deviation to novelty
pub const NOVELTY_GAIN: f64 = 5.0;

/// Merit above this stamps the channel's last-novel timestamp
pub const NOVEL_MERIT: f64 = 0.1;

/// Novelty below this counts as "unchanging" for habituation
pub const HABITUATION_NOVELTY_CEILING: f64 = 0.05;

/// Full-scale value of a byte magnitude sample
pub const MAX_MAGNITUDE: f64 = 255.0;

/// Default sample rate in Hz
pub const SAMPLE_RATE: f64 = 44_100.0;

/// Default transform size (frames carry FFT_SIZE / 2 bins)
pub const FFT_SIZE: usize = 4096;

/// Highest harmonic order multiplied into the product spectrum
pub const HPS_HARMONICS: usize = 5;

/// Lowest fundamental searched by the pitch estimator (Hz)
pub const MIN_PITCH_HZ: f64 = 60.0;

/// Highest fundamental searched by the pitch estimator (Hz)
pub const MAX_PITCH_HZ: f64 = 1200.0;

/// EMA factor for the frame-to-frame pitch
pub const PITCH_SMOOTHING: f64 = 0.8;

/// EMA factor for the frame-to-frame consonance
pub const CONSONANCE_SMOOTHING: f64 = 0.9;

/// Scale applied to a rise in smoothed consonance to produce resolution
pub const RESOLUTION_GAIN: f64 = 8.0;

/// Channel peaks below this byte magnitude are ignored
pub const PEAK_FLOOR: u8 = 20;

/// Distance from a consonant ratio at which the pair score reaches zero
pub const RATIO_TOLERANCE: f64 = 0.05;

/// Nominal mid-scale magnitude used to weight pair scores
pub const REFERENCE_MAGNITUDE: f64 = 128.0;

/// Octave-reduced just-intonation ratios treated as consonant:
/// fifth, fourth, major third, minor third, major sixth.
pub const CONSONANT_RATIOS: [f64; 5] = [3.0 / 2.0, 4.0 / 3.0, 5.0 / 4.0, 6.0 / 5.0, 5.0 / 3.0];

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;
