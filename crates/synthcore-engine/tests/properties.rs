//! Property-based tests for `synthcore-engine`'s voice-budget allocator
//! and pan/transposition math.

use proptest::prelude::*;
use synthcore_engine::{MultiTimbralEngine, VoiceBudgetStrategy, CHANNEL_COUNT};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For any active-channel subset and voice budget, the sum of
    /// per-channel voice counts never exceeds the budget, and every
    /// active channel gets at least one voice (`spec.md` §4.5 invariant).
    #[test]
    fn voice_budget_invariant_holds_for_equal_strategy(
        active_mask in prop::array::uniform16(any::<bool>()),
        max_total_voices in CHANNEL_COUNT..256usize,
    ) {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        // Guarantee at least one active channel so the allocator has
        // something to distribute across.
        let mut mask = active_mask;
        if !mask.iter().any(|&a| a) {
            mask[0] = true;
        }
        for (i, &active) in mask.iter().enumerate() {
            engine.set_channel_active(i, active);
        }
        engine.set_max_total_voices(max_total_voices);

        let mut total = 0usize;
        for i in 0..CHANNEL_COUNT {
            let ch = engine.channel(i).unwrap();
            if mask[i] {
                prop_assert!(ch.voice_count() >= 1);
                total += ch.voice_count();
            }
        }
        prop_assert!(total <= max_total_voices);
    }

    /// Same invariant under the priority-based strategy, for arbitrary
    /// per-channel priorities.
    #[test]
    fn voice_budget_invariant_holds_for_priority_strategy(
        priorities in prop::array::uniform16(0i32..1000),
        max_total_voices in CHANNEL_COUNT..256usize,
    ) {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_voice_budget_strategy(VoiceBudgetStrategy::PriorityBased);
        for (i, &p) in priorities.iter().enumerate() {
            engine.set_channel_priority(i, p);
        }
        engine.set_max_total_voices(max_total_voices);

        let total: usize = (0..CHANNEL_COUNT).map(|i| engine.channel(i).unwrap().voice_count()).sum();
        prop_assert!(total <= max_total_voices);
        for i in 0..CHANNEL_COUNT {
            prop_assert!(engine.channel(i).unwrap().voice_count() >= 1);
        }
    }

    /// Equal-power pan law: `L_gain^2 + R_gain^2 == 1` for any pan value
    /// in range, since `cos^2 + sin^2 = 1` identically.
    #[test]
    fn equal_power_pan_gains_preserve_unit_power(pan in -1.0f32..=1.0f32) {
        let angle = (pan + 1.0) * std::f32::consts::PI / 4.0;
        let (l, r) = (angle.cos(), angle.sin());
        prop_assert!((l * l + r * r - 1.0).abs() < 1e-5);
    }
}
