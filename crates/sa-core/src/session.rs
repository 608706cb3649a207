//! A listening session: configuration, clock and the latest snapshot.
//!
//! Frames are sequential: `step` takes `&mut self` and a session is the
//! single writer of its state.

use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{ConfigError, FrameError};
use crate::frame::SpectrumFrame;
use crate::pipeline::{Snapshot, reduce};

pub struct Session<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    snapshot: Snapshot,
}

impl Session<SystemClock> {
    /// Session driven by the system wall clock.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    /// Validates `config` first; an invalid config never yields a session.
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let snapshot = Snapshot::initial(&config, Uuid::new_v4(), clock.now_ms());
        tracing::debug!(
            session = %snapshot.session_id,
            channels = config.channels.len(),
            "session started"
        );
        Ok(Self {
            config,
            clock,
            snapshot,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Latest snapshot (the initial one before any frame).
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn frames_processed(&self) -> u64 {
        self.snapshot.frame
    }

    /// Check a frame's geometry against the session configuration.
    pub fn check_frame(&self, frame: &SpectrumFrame) -> Result<(), FrameError> {
        if frame.sample_rate != self.config.sample_rate {
            return Err(FrameError::SampleRate {
                expected: self.config.sample_rate,
                got: frame.sample_rate,
            });
        }
        if frame.fft_size != self.config.fft_size {
            return Err(FrameError::FftSize {
                expected: self.config.fft_size,
                got: frame.fft_size,
            });
        }
        if frame.len() != self.config.bin_count() {
            return Err(FrameError::Length {
                expected: self.config.bin_count(),
                got: frame.len(),
            });
        }
        Ok(())
    }

    /// Run one analysis pass. A rejected frame leaves the state untouched.
    pub fn step(&mut self, frame: &SpectrumFrame) -> Result<&Snapshot, FrameError> {
        if let Err(e) = self.check_frame(frame) {
            tracing::debug!(session = %self.snapshot.session_id, "rejected frame: {e}");
            return Err(e);
        }
        let now = self.clock.now_ms();
        self.snapshot = reduce(&self.snapshot, frame, &self.config, now);
        Ok(&self.snapshot)
    }

    /// Discard all state and start over from the initial values under a
    /// new session id.
    pub fn reset(&mut self) {
        let previous = self.snapshot.session_id;
        self.snapshot = Snapshot::initial(&self.config, Uuid::new_v4(), self.clock.now_ms());
        tracing::debug!(
            previous = %previous,
            session = %self.snapshot.session_id,
            "session reset"
        );
    }

    /// Consume the session, returning its final snapshot.
    pub fn finish(self) -> Snapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn session() -> Session<ManualClock> {
        Session::with_clock(EngineConfig::default(), ManualClock::new(1_000.0)).unwrap()
    }

    #[test]
    fn test_invalid_config_yields_no_session() {
        let config = EngineConfig {
            channels: vec![],
            ..Default::default()
        };
        assert_eq!(Session::new(config).err(), Some(ConfigError::NoChannels));
    }

    #[test]
    fn test_mismatched_frame_is_rejected() {
        let mut s = session();
        let frame = SpectrumFrame::silent(48_000.0, 4096);
        assert!(matches!(s.step(&frame), Err(FrameError::SampleRate { .. })));

        let short = SpectrumFrame::new(vec![0; 10], 44_100.0, 4096);
        assert_eq!(
            s.step(&short).err(),
            Some(FrameError::Length {
                expected: 2048,
                got: 10
            })
        );
        assert_eq!(s.frames_processed(), 0);
    }

    #[test]
    fn test_step_uses_clock() {
        let mut s = session();
        s.clock().advance_ms(16.0);
        let frame = SpectrumFrame::silent(44_100.0, 4096);
        let snap = s.step(&frame).unwrap();
        assert_eq!(snap.timestamp, 1_016.0);
        assert_eq!(snap.frame, 1);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut s = session();
        let loud = SpectrumFrame::new(vec![255; 2048], 44_100.0, 4096);
        for _ in 0..50 {
            s.clock().advance_ms(16.0);
            s.step(&loud).unwrap();
        }
        let old_id = s.snapshot().session_id;
        assert!(s.snapshot().channels.iter().any(|c| c.habituation > 0.0));

        s.reset();
        let snap = s.snapshot();
        assert_ne!(snap.session_id, old_id);
        assert_eq!(snap.frame, 0);
        for c in &snap.channels {
            assert_eq!(c.current_signal, 0.0);
            assert_eq!(c.merit, 0.0);
            assert_eq!(c.habituation, 0.0);
            assert_eq!(c.threshold, s.config().tracker.base_threshold);
            assert_eq!(c.attention, 1.0 / 7.0);
            assert_eq!(c.last_novel_timestamp, 1_800.0);
            assert!(c.signal_history.iter().all(|&v| v == 0.0));
            assert_eq!(c.signal_history.len(), 30);
        }
        assert_eq!(snap.harmony.consonance, 0.0);
    }
}
