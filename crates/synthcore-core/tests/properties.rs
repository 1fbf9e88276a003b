//! Property-based tests for synthcore-core DSP primitives.

use proptest::prelude::*;
use synthcore_core::{
    Biquad, SmoothParameter, StateVariableFilter, bandpass_coefficients, highpass_coefficients,
    lowpass_coefficients, notch_coefficients,
};

/// Biquad coefficient generators indexed 0..4 (LP, HP, BP, Notch).
fn configure_biquad(biquad: &mut Biquad, variant: usize, freq: f32, q: f32) {
    let sr = 48000.0;
    let (b0, b1, b2, a0, a1, a2) = match variant % 4 {
        0 => lowpass_coefficients(freq, q, sr),
        1 => highpass_coefficients(freq, q, sr),
        2 => bandpass_coefficients(freq, q, sr),
        3 => notch_coefficients(freq, q, sr),
        _ => unreachable!(),
    };
    biquad.set_coefficients(b0, b1, b2, a0, a1, a2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For any valid cutoff and Q, Biquad filters produce finite output
    /// for 512 samples of random finite input.
    #[test]
    fn biquad_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.1f32..10.0f32,
        variant in 0usize..4,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut biquad = Biquad::new();
        configure_biquad(&mut biquad, variant, freq, q);

        for &sample in &input {
            let out = biquad.process(sample);
            prop_assert!(out.is_finite());
        }
    }

    /// The state-variable filter's four simultaneous outputs stay finite
    /// across any cutoff/resonance pair and random input.
    #[test]
    fn svf_stability(
        cutoff in 20.0f32..20000.0f32,
        resonance in 0.5f32..10.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut svf = StateVariableFilter::new(48_000.0);
        svf.set_cutoff(cutoff);
        svf.set_resonance(resonance);

        for &sample in &input {
            let (low, high, band, notch) = svf.process_all(sample);
            prop_assert!(low.is_finite() && high.is_finite() && band.is_finite() && notch.is_finite());
        }
    }

    /// `SmoothParameter` always converges to its target within a bounded
    /// number of blocks and never overshoots past it (`spec.md` §4.9).
    #[test]
    fn smooth_parameter_converges_to_target(
        initial in -10.0f32..10.0f32,
        target in -10.0f32..10.0f32,
    ) {
        let mut param = SmoothParameter::new(initial);
        param.set_target(target);

        let mut last = initial;
        for _ in 0..10_000 {
            let value = param.process();
            prop_assert!(value.is_finite());
            last = value;
        }
        prop_assert!((last - target).abs() < 1e-2);
    }
}
