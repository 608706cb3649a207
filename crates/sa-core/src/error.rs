use std::fmt;

/// A configuration that cannot drive a session.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    SampleRate(f64),
    FftSize(usize),
    NoChannels,
    DuplicateChannel(u32),
    FrequencyRange { id: u32, lo: f64, hi: f64, nyquist: f64 },
    Factor { name: &'static str, value: f64 },
    HistoryLength,
    PitchRange { min: f64, max: f64 },
    Harmonics,
    Positive { name: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SampleRate(v) => write!(f, "sample rate must be positive, got {v}"),
            ConfigError::FftSize(n) => {
                write!(f, "fft size must be a power of two in 32..=32768, got {n}")
            }
            ConfigError::NoChannels => write!(f, "at least one channel must be configured"),
            ConfigError::DuplicateChannel(id) => write!(f, "duplicate channel id {id}"),
            ConfigError::FrequencyRange {
                id,
                lo,
                hi,
                nyquist,
            } => write!(
                f,
                "channel {id}: frequency range {lo}..{hi} Hz must satisfy 0 <= lo < hi <= {nyquist}"
            ),
            ConfigError::Factor { name, value } => {
                write!(f, "{name} must lie in [0, 1], got {value}")
            }
            ConfigError::HistoryLength => write!(f, "history_length must be at least 1"),
            ConfigError::PitchRange { min, max } => {
                write!(f, "pitch search range {min}..{max} Hz is empty or negative")
            }
            ConfigError::Harmonics => write!(f, "harmonics must be at least 1"),
            ConfigError::Positive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A spectrum frame whose geometry disagrees with the session it was fed to.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    SampleRate { expected: f64, got: f64 },
    FftSize { expected: usize, got: usize },
    Length { expected: usize, got: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::SampleRate { expected, got } => {
                write!(f, "frame sample rate {got} Hz, session expects {expected} Hz")
            }
            FrameError::FftSize { expected, got } => {
                write!(f, "frame fft size {got}, session expects {expected}")
            }
            FrameError::Length { expected, got } => {
                write!(f, "frame carries {got} bins, expected {expected}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// A consonance matrix whose value count is not `size * size`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixShapeError {
    pub size: usize,
    pub len: usize,
}

impl fmt::Display for MatrixShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "consonance matrix of size {} needs {} values, got {}",
            self.size,
            self.size * self.size,
            self.len
        )
    }
}

impl std::error::Error for MatrixShapeError {}
