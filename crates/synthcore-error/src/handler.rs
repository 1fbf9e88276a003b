//! `ErrorHandler`: the component (C12) tying the taxonomy, RT-safe
//! queue, recovery registry, bounded history, and performance-threshold
//! monitoring together, mirroring `AudioErrorHandler.h`'s
//! `AudioErrorHandler` class.

use std::collections::VecDeque;

use tracing::{error, warn};

use crate::code::{ErrorCode, ErrorSeverity};
use crate::recovery::{RecoveryAction, RecoveryRegistry, RecoveryResult};
use crate::report::ErrorReport;
use crate::rt_queue::{RtErrorQueue, RT_QUEUE_SIZE};
use crate::stats::ErrorStatistics;

/// `callback(&report)`.
pub type ErrorCallback = Box<dyn FnMut(&ErrorReport) + Send>;
/// `callback(&report, &recovery_result)`.
pub type RecoveryCallback = Box<dyn FnMut(&ErrorReport, &RecoveryResult) + Send>;

/// Performance thresholds above which [`ErrorHandler::update_performance`]
/// synthesizes a [`ErrorCode::PerformanceGoalMissed`]-family error.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceThresholds {
    /// Maximum acceptable CPU load, `[0, 100]`.
    pub max_cpu_load: f32,
    /// Maximum acceptable latency, in microseconds.
    pub max_latency_us: u64,
    /// Maximum acceptable jitter, in microseconds.
    pub max_jitter_us: u64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_cpu_load: 80.0,
            max_latency_us: 10_000,
            max_jitter_us: 1_000,
        }
    }
}

/// Central error-handling and recovery coordinator for the engine.
/// Fallible non-RT operations call [`report`](Self::report); the RT
/// audio thread calls [`report_rt`](Self::report_rt), which never
/// allocates or blocks, and a control-thread tick later calls
/// [`drain_rt_errors`](Self::drain_rt_errors) to fold those into history.
pub struct ErrorHandler {
    history: VecDeque<ErrorReport>,
    max_history: usize,
    recovery: RecoveryRegistry,
    rt_queue: RtErrorQueue,
    stats: ErrorStatistics,
    auto_recovery_enabled: bool,
    thresholds: PerformanceThresholds,
    sample_rate: Option<u32>,
    buffer_size: Option<u32>,
    error_callback: Option<ErrorCallback>,
    recovery_callback: Option<RecoveryCallback>,
    critical_callback: Option<ErrorCallback>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler {
    /// Create a handler with a `1000`-entry history, auto-recovery
    /// enabled, and default performance thresholds.
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
            max_history: 1000,
            recovery: RecoveryRegistry::new(),
            rt_queue: RtErrorQueue::new(RT_QUEUE_SIZE),
            stats: ErrorStatistics::default(),
            auto_recovery_enabled: true,
            thresholds: PerformanceThresholds::default(),
            sample_rate: None,
            buffer_size: None,
            error_callback: None,
            recovery_callback: None,
            critical_callback: None,
        }
    }

    /// Report an error from a non-RT context, attempting recovery if
    /// enabled and notifying any registered callbacks.
    pub fn report(&mut self, report: ErrorReport) -> RecoveryResult {
        self.record(report)
    }

    /// Report an error that demands immediate attention regardless of
    /// the auto-recovery setting; always attempted, always notified via
    /// the critical-error callback.
    pub fn report_critical(&mut self, mut report: ErrorReport) -> RecoveryResult {
        report.severity = ErrorSeverity::Critical;
        let result = self.record(report.clone());
        error!(code = ?report.code, message = %report.message, "critical audio error");
        if let Some(callback) = self.critical_callback.as_mut() {
            callback(&report);
        }
        result
    }

    /// Push a lightweight error entry from the RT audio thread. Never
    /// allocates or blocks; a full queue silently drops the report.
    pub fn report_rt(&self, code: ErrorCode, message: &str) {
        self.rt_queue.push(code, message);
    }

    /// Drain everything queued by [`report_rt`](Self::report_rt) and
    /// fold it into history and statistics. Call periodically from a
    /// non-RT thread.
    pub fn drain_rt_errors(&mut self) {
        let entries = self.rt_queue.drain();
        for entry in entries {
            let report = ErrorReport::new(entry.code, ErrorSeverity::Warning, entry.message().to_owned())
                .with_realtime(true);
            self.stats.realtime_errors += 1;
            self.record(report);
        }
    }

    fn record(&mut self, report: ErrorReport) -> RecoveryResult {
        if report.severity == ErrorSeverity::Critical {
            self.stats.critical_errors += 1;
            self.stats.last_critical_error = Some(report.timestamp);
        }
        self.stats.total_errors += 1;
        self.stats.last_error = Some(report.timestamp);
        *self.stats.error_counts.entry(report.code).or_insert(0) += 1;

        let result = if self.auto_recovery_enabled {
            let r = self.recovery.attempt(report.code, report.from_realtime);
            if r.successful {
                self.stats.recovered_errors += 1;
            } else {
                self.stats.unrecovered_errors += 1;
            }
            r
        } else {
            RecoveryResult::default()
        };

        if !result.successful {
            warn!(code = ?report.code, message = %report.message, "unrecovered audio error");
        }

        if let Some(callback) = self.error_callback.as_mut() {
            callback(&report);
        }
        if let Some(callback) = self.recovery_callback.as_mut() {
            callback(&report, &result);
        }

        self.add_to_history(report);
        result
    }

    fn add_to_history(&mut self, report: ErrorReport) {
        self.history.push_back(report);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Set the audio stream context used to annotate subsequent reports.
    pub fn set_stream_context(&mut self, sample_rate: u32, buffer_size: u32) {
        self.sample_rate = Some(sample_rate);
        self.buffer_size = Some(buffer_size);
    }

    /// Register a recovery action for `code`.
    pub fn register_recovery(&mut self, code: ErrorCode, action: RecoveryAction) {
        self.recovery.register(code, action);
    }

    /// Remove all recovery actions registered for `code`.
    pub fn remove_recovery(&mut self, code: ErrorCode) {
        self.recovery.remove(code);
    }

    /// Remove every registered recovery action.
    pub fn clear_recovery_actions(&mut self) {
        self.recovery.clear();
    }

    /// Most recent `max_count` reports at or above `min_severity`,
    /// newest first.
    pub fn recent_errors(&self, max_count: usize, min_severity: ErrorSeverity) -> Vec<&ErrorReport> {
        self.history
            .iter()
            .rev()
            .filter(|r| r.severity >= min_severity)
            .take(max_count)
            .collect()
    }

    /// Accumulated statistics.
    pub fn statistics(&self) -> &ErrorStatistics {
        &self.stats
    }

    /// Clear all history and reset statistics.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.stats = ErrorStatistics::default();
    }

    /// Register the general error callback, replacing any previous one.
    pub fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.error_callback = Some(callback);
    }

    /// Register the recovery-notification callback, replacing any
    /// previous one.
    pub fn set_recovery_callback(&mut self, callback: RecoveryCallback) {
        self.recovery_callback = Some(callback);
    }

    /// Register the critical-error callback, replacing any previous one.
    pub fn set_critical_error_callback(&mut self, callback: ErrorCallback) {
        self.critical_callback = Some(callback);
    }

    /// Set the maximum number of reports retained in history.
    pub fn set_max_history(&mut self, max_errors: usize) {
        self.max_history = max_errors.max(1);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Enable or disable automatic recovery attempts.
    pub fn set_auto_recovery_enabled(&mut self, enabled: bool) {
        self.auto_recovery_enabled = enabled;
    }

    /// Set the performance thresholds [`update_performance`](Self::update_performance)
    /// checks against.
    pub fn set_performance_thresholds(&mut self, thresholds: PerformanceThresholds) {
        self.thresholds = thresholds;
    }

    /// Feed current performance metrics in; any threshold breach
    /// synthesizes and records a matching performance error.
    pub fn update_performance(&mut self, cpu_load: f32, latency_us: u64, jitter_us: u64) {
        let n = self.stats.total_errors.max(1) as f32;
        self.stats.average_cpu_load = (self.stats.average_cpu_load * (n - 1.0) + cpu_load) / n;
        self.stats.average_latency_us =
            (self.stats.average_latency_us * (n as f64 - 1.0) + latency_us as f64) / n as f64;
        self.stats.max_jitter_us = self.stats.max_jitter_us.max(jitter_us);

        if cpu_load > self.thresholds.max_cpu_load {
            let report = ErrorReport::new(
                ErrorCode::CpuOverload,
                ErrorSeverity::Warning,
                format!("CPU load {cpu_load:.1}% exceeds threshold {:.1}%", self.thresholds.max_cpu_load),
            );
            self.record(report);
        }
        if latency_us > self.thresholds.max_latency_us {
            let report = ErrorReport::new(
                ErrorCode::LatencyBudgetExceeded,
                ErrorSeverity::Warning,
                format!("latency {latency_us}us exceeds budget {}us", self.thresholds.max_latency_us),
            );
            self.record(report);
        }
        if jitter_us > self.thresholds.max_jitter_us {
            let report = ErrorReport::new(
                ErrorCode::JitterTooHigh,
                ErrorSeverity::Warning,
                format!("jitter {jitter_us}us exceeds budget {}us", self.thresholds.max_jitter_us),
            );
            self.record(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_updates_statistics_and_history() {
        let mut handler = ErrorHandler::new();
        handler.report(ErrorReport::new(ErrorCode::StreamUnderrun, ErrorSeverity::Warning, "underrun"));
        assert_eq!(handler.statistics().total_errors, 1);
        assert_eq!(handler.recent_errors(10, ErrorSeverity::Info).len(), 1);
    }

    #[test]
    fn registered_recovery_action_is_reflected_in_stats() {
        let mut handler = ErrorHandler::new();
        handler.register_recovery(
            ErrorCode::StreamUnderrun,
            RecoveryAction::new("reopen stream", Box::new(|| true)),
        );
        let result = handler.report(ErrorReport::new(ErrorCode::StreamUnderrun, ErrorSeverity::Error, "x"));
        assert!(result.successful);
        assert_eq!(handler.statistics().recovered_errors, 1);
    }

    #[test]
    fn critical_report_invokes_critical_callback() {
        let mut handler = ErrorHandler::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(false));
        let seen_cb = seen.clone();
        handler.set_critical_error_callback(Box::new(move |_r| {
            *seen_cb.lock().unwrap() = true;
        }));
        handler.report_critical(ErrorReport::new(ErrorCode::EmergencyMute, ErrorSeverity::Error, "clip"));
        assert!(*seen.lock().unwrap());
        assert_eq!(handler.statistics().critical_errors, 1);
    }

    #[test]
    fn rt_report_is_folded_in_on_drain() {
        let mut handler = ErrorHandler::new();
        handler.report_rt(ErrorCode::CallbackTimeout, "deadline missed");
        assert_eq!(handler.statistics().total_errors, 0);
        handler.drain_rt_errors();
        assert_eq!(handler.statistics().total_errors, 1);
        assert_eq!(handler.statistics().realtime_errors, 1);
    }

    #[test]
    fn performance_threshold_breach_synthesizes_an_error() {
        let mut handler = ErrorHandler::new();
        handler.set_performance_thresholds(PerformanceThresholds {
            max_cpu_load: 50.0,
            max_latency_us: 5_000,
            max_jitter_us: 500,
        });
        handler.update_performance(95.0, 1_000, 100);
        assert_eq!(handler.statistics().total_errors, 1);
        assert_eq!(
            *handler.statistics().error_counts.get(&ErrorCode::CpuOverload).unwrap(),
            1
        );
    }

    #[test]
    fn history_is_capped_at_max() {
        let mut handler = ErrorHandler::new();
        handler.set_max_history(2);
        for _ in 0..5 {
            handler.report(ErrorReport::new(ErrorCode::BufferOverflow, ErrorSeverity::Info, "x"));
        }
        assert_eq!(handler.recent_errors(10, ErrorSeverity::Info).len(), 2);
    }
}
