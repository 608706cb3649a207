//! Spectral attention engine.
//!
//! Consumes one frequency-magnitude frame at a time and derives, per
//! frequency band, smoothed loudness, novelty, habituation, activation and
//! attention share, plus global pitch/consonance from a harmonic product
//! spectrum and pairwise consonance between band peaks.
//!
//! Zero I/O: a pure reducer from (previous snapshot, frame) to the next
//! snapshot, wrapped in a [`Session`] that owns the clock and state.

pub mod attention;
pub mod channel;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod harmony;
pub mod interharmonic;
pub mod pipeline;
pub mod session;
pub mod wire;

pub use channel::ChannelState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ChannelDef, EngineConfig, HarmonyTuning, InterharmonicTuning, TrackerTuning,
    reference_channels,
};
pub use error::{ConfigError, FrameError, MatrixShapeError};
pub use frame::{SpectrumFrame, freq_to_index};
pub use harmony::{HarmonyState, PitchEstimate};
pub use interharmonic::ConsonanceMatrix;
pub use pipeline::{Snapshot, reduce};
pub use session::Session;
pub use wire::{WIRE_VERSION, export_json, frame_from_json, frame_to_json, import_json};
