//! Error statistics accumulated by [`crate::ErrorHandler`].

use std::collections::HashMap;
use std::time::SystemTime;

use crate::code::ErrorCode;

/// Running counters over everything reported to an [`crate::ErrorHandler`].
#[derive(Debug, Clone)]
pub struct ErrorStatistics {
    /// Total errors reported.
    pub total_errors: u64,
    /// Errors reported at [`crate::ErrorSeverity::Critical`].
    pub critical_errors: u64,
    /// Errors for which recovery succeeded.
    pub recovered_errors: u64,
    /// Errors for which recovery was attempted but failed.
    pub unrecovered_errors: u64,
    /// Errors reported from the RT audio thread.
    pub realtime_errors: u64,
    /// Per-code occurrence counts.
    pub error_counts: HashMap<ErrorCode, u64>,
    /// Timestamp of the most recent error, if any.
    pub last_error: Option<SystemTime>,
    /// Timestamp of the most recent critical error, if any.
    pub last_critical_error: Option<SystemTime>,
    /// Running average CPU load across [`crate::ErrorHandler::update_performance`] calls.
    pub average_cpu_load: f32,
    /// Running average latency in microseconds.
    pub average_latency_us: f64,
    /// Highest jitter observed, in microseconds.
    pub max_jitter_us: u64,
}

impl Default for ErrorStatistics {
    fn default() -> Self {
        Self {
            total_errors: 0,
            critical_errors: 0,
            recovered_errors: 0,
            unrecovered_errors: 0,
            realtime_errors: 0,
            error_counts: HashMap::new(),
            last_error: None,
            last_critical_error: None,
            average_cpu_load: 0.0,
            average_latency_us: 0.0,
            max_jitter_us: 0,
        }
    }
}

impl ErrorStatistics {
    /// Fraction of recovery attempts that succeeded, `0.0` if none were
    /// attempted.
    pub fn recovery_success_rate(&self) -> f32 {
        let attempted = self.recovered_errors + self.unrecovered_errors;
        if attempted == 0 {
            0.0
        } else {
            self.recovered_errors as f32 / attempted as f32
        }
    }
}
