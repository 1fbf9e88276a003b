//! Full-context error report and the `thiserror`-derived error type
//! returned from non-RT fallible APIs, mirroring `AudioErrorHandler.h`'s
//! `AudioError` struct.

use std::time::SystemTime;

use thiserror::Error;

use crate::code::{ErrorCode, ErrorSeverity};

/// A fully-contextualized error, as recorded in [`crate::ErrorHandler`]'s
/// history. Constructed off the RT thread; the RT-safe fast path uses
/// the leaner queue entry in [`crate::rt_queue`] instead.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Taxonomy code.
    pub code: ErrorCode,
    /// Severity.
    pub severity: ErrorSeverity,
    /// Human-readable description.
    pub message: String,
    /// What operation was in progress when the error occurred.
    pub context: String,
    /// When the error was reported.
    pub timestamp: SystemTime,
    /// Sample rate active at the time of the error, if known.
    pub sample_rate: Option<u32>,
    /// Buffer size active at the time of the error, if known.
    pub buffer_size: Option<u32>,
    /// CPU load, `[0, 100]`, at the time of the error.
    pub cpu_load: f32,
    /// Measured latency in microseconds at the time of the error.
    pub latency_us: u64,
    /// Measured jitter in microseconds at the time of the error.
    pub jitter_us: u64,
    /// Whether this error is considered recoverable.
    pub recoverable: bool,
    /// Whether recovering from this error requires a full restart.
    pub requires_restart: bool,
    /// Whether this report originated from the RT audio thread.
    pub from_realtime: bool,
}

impl ErrorReport {
    /// Build a report with the given code, severity and message; all
    /// context fields default to their empty/zero values.
    pub fn new(code: ErrorCode, severity: ErrorSeverity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            context: String::new(),
            timestamp: SystemTime::now(),
            sample_rate: None,
            buffer_size: None,
            cpu_load: 0.0,
            latency_us: 0,
            jitter_us: 0,
            recoverable: false,
            requires_restart: false,
            from_realtime: false,
        }
    }

    /// Set the operation context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Mark this report as having originated on the RT audio thread.
    pub fn with_realtime(mut self, from_realtime: bool) -> Self {
        self.from_realtime = from_realtime;
        self
    }
}

/// Error type returned from fallible `synthcore` APIs, one variant per
/// taxonomy category.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Hardware/device failure.
    #[error("device error {code:?}: {message}")]
    Device {
        /// Specific code within the device category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Stream lifecycle failure.
    #[error("stream error {code:?}: {message}")]
    Stream {
        /// Specific code within the stream category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Audio callback failure.
    #[error("callback error {code:?}: {message}")]
    Callback {
        /// Specific code within the callback category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// DSP/processing failure.
    #[error("processing error {code:?}: {message}")]
    Processing {
        /// Specific code within the processing category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// System resource exhaustion.
    #[error("resource error {code:?}: {message}")]
    Resource {
        /// Specific code within the resource category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Thread-safety violation.
    #[error("concurrency error {code:?}: {message}")]
    Concurrency {
        /// Specific code within the concurrency category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Missed performance goal.
    #[error("performance error {code:?}: {message}")]
    Performance {
        /// Specific code within the performance category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Audio safety violation.
    #[error("safety error {code:?}: {message}")]
    Safety {
        /// Specific code within the safety category.
        code: ErrorCode,
        /// Description.
        message: String,
    },

    /// Unclassified error.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<&ErrorReport> for SynthError {
    fn from(report: &ErrorReport) -> Self {
        use crate::code::ErrorCategory::*;
        let code = report.code;
        let message = report.message.clone();
        match code.category() {
            Device => SynthError::Device { code, message },
            Stream => SynthError::Stream { code, message },
            Callback => SynthError::Callback { code, message },
            Processing => SynthError::Processing { code, message },
            Resource => SynthError::Resource { code, message },
            Concurrency => SynthError::Concurrency { code, message },
            Performance => SynthError::Performance { code, message },
            Safety => SynthError::Safety { code, message },
            Unknown => SynthError::Unknown(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_converts_into_matching_error_variant() {
        let report = ErrorReport::new(ErrorCode::StreamUnderrun, ErrorSeverity::Warning, "underrun");
        let err = SynthError::from(&report);
        assert!(matches!(err, SynthError::Stream { .. }));
    }

    #[test]
    fn unknown_code_maps_to_unknown_variant() {
        let report = ErrorReport::new(ErrorCode::Unknown, ErrorSeverity::Error, "mystery");
        let err = SynthError::from(&report);
        assert!(matches!(err, SynthError::Unknown(_)));
    }
}
