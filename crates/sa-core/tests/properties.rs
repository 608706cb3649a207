//! Property tests: invariants that must hold for any sequence of frames.

use proptest::prelude::*;
use sa_core::interharmonic::{octave_reduce, ratio_score};
use sa_core::{ChannelDef, EngineConfig, ManualClock, Session, SpectrumFrame};

const FFT: usize = 256;
const RATE: f64 = 8_000.0;

/// Small geometry so each case stays cheap: 128 bins of 31.25 Hz.
fn small_config() -> EngineConfig {
    EngineConfig {
        sample_rate: RATE,
        fft_size: FFT,
        channels: vec![
            ChannelDef::new(1, "low", 30.0, 250.0),
            ChannelDef::new(2, "mid", 250.0, 1000.0),
            ChannelDef::new(3, "high", 1000.0, 4000.0),
            ChannelDef::new(4, "edge", 3900.0, 4000.0),
        ],
        ..Default::default()
    }
}

fn frames() -> impl Strategy<Value = Vec<(Vec<u8>, u16)>> {
    prop::collection::vec(
        (prop::collection::vec(any::<u8>(), FFT / 2), 0u16..100),
        1..40,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn state_invariants_hold(frames in frames()) {
        let config = small_config();
        let mut s = Session::with_clock(config.clone(), ManualClock::new(0.0)).unwrap();
        let t = &config.tracker;

        for (mags, dt) in frames {
            s.clock().advance_ms(dt as f64);
            let snap = s.step(&SpectrumFrame::new(mags, RATE, FFT)).unwrap();

            for c in &snap.channels {
                prop_assert!((0.0..=1.0).contains(&c.habituation));
                prop_assert_eq!(c.threshold, t.base_threshold + c.habituation * t.threshold_scale);
                prop_assert!(c.current_signal >= 0.0 && c.current_signal <= 1.0 + 1e-12);
                prop_assert!(c.merit >= 0.0 && c.merit.is_finite());
                prop_assert!(c.attention.is_finite() && c.attention >= 0.0);
                prop_assert_eq!(c.signal_history.len(), t.history_length);
            }

            let h = &snap.harmony;
            prop_assert_eq!(h.tension, 1.0 - h.consonance);
            prop_assert!(h.pitch.is_finite() && h.pitch >= 0.0);
            prop_assert!((0.0..=1.0).contains(&h.resolution));

            let m = &h.inter_channel_consonance;
            prop_assert!(m.is_symmetric());
            for i in 0..m.size() {
                prop_assert_eq!(m.get(i, i), 0.0);
                for j in 0..m.size() {
                    prop_assert!(m.get(i, j) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn octave_reduction_lands_in_one_octave(ratio in 1e-3f64..1e3) {
        let r = octave_reduce(ratio);
        prop_assert!((1.0..2.0).contains(&r), "{ratio} reduced to {r}");
    }

    #[test]
    fn ratio_score_is_symmetric_and_bounded(a in 20.0f64..20_000.0, b in 20.0f64..20_000.0) {
        let ab = ratio_score(a, b, 0.05);
        let ba = ratio_score(b, a, 0.05);
        prop_assert_eq!(ab, ba);
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn octave_shift_preserves_ratio_score(f in 50.0f64..2_000.0, octaves in 1u32..4) {
        let fifth = f * 1.5;
        let shifted = fifth * 2f64.powi(octaves as i32);
        prop_assert!((ratio_score(f, shifted, 0.05) - 1.0).abs() < 1e-9);
    }
}
