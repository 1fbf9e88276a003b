//! Property-based tests for transport advancement and looping.

use proptest::prelude::*;
use synthcore_sequencer::Sequencer;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A stopped sequencer's position never moves, regardless of how
    /// much time is fed to `process`.
    #[test]
    fn stopped_sequencer_position_is_frozen(
        bpm in 20.0f32..300.0f32,
        deltas in prop::collection::vec(0.0f32..1.0f32, 1..32),
    ) {
        let mut seq = Sequencer::new();
        seq.set_tempo(bpm);
        let before = seq.position_beats();
        for d in deltas {
            seq.process(d);
        }
        prop_assert_eq!(seq.position_beats(), before);
    }

    /// A playing, looping sequencer's position always stays within
    /// `[0, loop_length_beats)`.
    #[test]
    fn looping_position_stays_within_loop_bounds(
        bpm in 20.0f32..300.0f32,
        loop_beats in 1.0f32..16.0f32,
        deltas in prop::collection::vec(0.0f32..2.0f32, 1..64),
    ) {
        let mut seq = Sequencer::new();
        seq.set_tempo(bpm);
        seq.set_looping(true);
        seq.set_loop_length_beats(loop_beats);
        seq.start();
        for d in deltas {
            seq.process(d);
            prop_assert!(seq.position_beats() >= 0.0);
            prop_assert!(seq.position_beats() < loop_beats);
        }
    }
}
