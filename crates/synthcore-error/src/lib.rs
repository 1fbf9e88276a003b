//! synthcore-error - RT-safe error taxonomy, lock-free reporting queue,
//! and recovery-action registry (component C12).
//!
//! Non-RT code reports through [`ErrorHandler::report`] /
//! [`ErrorHandler::report_critical`], which run the recovery registry
//! and notify callbacks synchronously. The RT audio thread instead
//! calls [`ErrorHandler::report_rt`], which never allocates or blocks;
//! a control-thread tick later calls [`ErrorHandler::drain_rt_errors`]
//! to fold those into the same history and statistics.
//!
//! Grounded in `original_source/include/audio/AudioErrorHandler.h`.
//!
//! ```
//! use synthcore_error::{ErrorHandler, ErrorReport, ErrorCode, ErrorSeverity};
//!
//! let mut handler = ErrorHandler::new();
//! handler.report(ErrorReport::new(
//!     ErrorCode::StreamUnderrun,
//!     ErrorSeverity::Warning,
//!     "ring buffer ran dry",
//! ));
//! assert_eq!(handler.statistics().total_errors, 1);
//! ```

mod code;
mod handler;
mod recovery;
mod report;
mod rt_queue;
mod stats;

pub use code::{ErrorCategory, ErrorCode, ErrorSeverity};
pub use handler::{ErrorCallback, ErrorHandler, PerformanceThresholds, RecoveryCallback};
pub use recovery::{RecoveryAction, RecoveryRegistry, RecoveryResult};
pub use report::{ErrorReport, SynthError};
pub use rt_queue::{RtError, RtErrorQueue, RT_MESSAGE_CAPACITY, RT_QUEUE_SIZE};
pub use stats::ErrorStatistics;
