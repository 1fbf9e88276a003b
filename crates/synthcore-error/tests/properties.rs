//! Property-based tests for the RT error queue and the error handler's
//! drain/statistics bookkeeping.

use proptest::prelude::*;
use synthcore_error::{ErrorCode, ErrorHandler, RT_QUEUE_SIZE};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every RT error pushed and then drained (within queue capacity)
    /// is folded exactly once into cumulative statistics, never lost
    /// and never double-counted.
    #[test]
    fn drain_folds_every_queued_error_exactly_once(count in 0usize..RT_QUEUE_SIZE) {
        let mut handler = ErrorHandler::new();
        for _ in 0..count {
            handler.report_rt(ErrorCode::AudioClipping, "clipping");
        }
        handler.drain_rt_errors();
        prop_assert_eq!(handler.statistics().total_errors, count as u64);
        prop_assert_eq!(handler.statistics().realtime_errors, count as u64);
    }

    /// Recorded history never grows past the configured maximum.
    #[test]
    fn history_never_exceeds_max_history(
        max_history in 1usize..50,
        count in 0usize..RT_QUEUE_SIZE,
    ) {
        let mut handler = ErrorHandler::new();
        handler.set_max_history(max_history);
        for _ in 0..count {
            handler.report_rt(ErrorCode::AudioClipping, "clipping");
        }
        handler.drain_rt_errors();
        prop_assert!(handler.recent_errors(usize::MAX, synthcore_error::ErrorSeverity::Info).len() <= max_history);
    }
}
