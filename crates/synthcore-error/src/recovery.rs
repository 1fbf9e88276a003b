//! Recovery action registry, mirroring `AudioErrorHandler.h`'s
//! `AudioRecoveryAction`/`attemptRecovery`: actions are registered per
//! error code, tried in descending priority order, and gated by
//! whether the calling context is real-time.

use std::collections::HashMap;
use std::time::Instant;

use crate::code::ErrorCode;

/// A single remediation step registered against an [`ErrorCode`].
pub struct RecoveryAction {
    /// Human-readable description, surfaced in [`RecoveryResult`].
    pub description: String,
    /// The remediation itself; returns whether it succeeded.
    pub action: Box<dyn FnMut() -> bool + Send>,
    /// Higher-priority actions are tried first.
    pub priority: i32,
    /// Maximum number of attempts before giving up.
    pub max_retries: u32,
    /// Whether this action is safe to run from the audio callback.
    pub allow_in_realtime: bool,
}

impl RecoveryAction {
    /// Create a recovery action with default priority `0`, one retry,
    /// and `allow_in_realtime = false`.
    pub fn new(description: impl Into<String>, action: Box<dyn FnMut() -> bool + Send>) -> Self {
        Self {
            description: description.into(),
            action,
            priority: 0,
            max_retries: 1,
            allow_in_realtime: false,
        }
    }
}

/// Outcome of attempting recovery for one error.
#[derive(Debug, Clone, Default)]
pub struct RecoveryResult {
    /// Whether some registered action succeeded.
    pub successful: bool,
    /// Description of the action that succeeded, if any.
    pub action_taken: String,
    /// Number of attempts spent across all tried actions.
    pub retries_used: u32,
    /// Wall-clock time spent attempting recovery, in microseconds.
    pub time_spent_us: u64,
    /// Whether recovery was attempted from a real-time context.
    pub was_realtime: bool,
}

/// Priority-ordered table of recovery actions keyed by error code.
#[derive(Default)]
pub struct RecoveryRegistry {
    actions: HashMap<ErrorCode, Vec<RecoveryAction>>,
}

impl RecoveryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action for `code`, keeping the action list sorted by
    /// descending priority.
    pub fn register(&mut self, code: ErrorCode, action: RecoveryAction) {
        let entries = self.actions.entry(code).or_default();
        entries.push(action);
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove every action registered for `code`.
    pub fn remove(&mut self, code: ErrorCode) {
        self.actions.remove(&code);
    }

    /// Remove all registered actions.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Attempt recovery for `code`: try each registered action in
    /// priority order, each up to its `max_retries`, until one
    /// succeeds. In a real-time context, actions with
    /// `allow_in_realtime = false` are skipped entirely.
    pub fn attempt(&mut self, code: ErrorCode, is_realtime: bool) -> RecoveryResult {
        let start = Instant::now();
        let mut result = RecoveryResult {
            was_realtime: is_realtime,
            ..Default::default()
        };

        let Some(entries) = self.actions.get_mut(&code) else {
            result.time_spent_us = start.elapsed().as_micros() as u64;
            return result;
        };

        for entry in entries.iter_mut() {
            if is_realtime && !entry.allow_in_realtime {
                continue;
            }
            for _ in 0..entry.max_retries.max(1) {
                result.retries_used += 1;
                if (entry.action)() {
                    result.successful = true;
                    result.action_taken = entry.description.clone();
                    result.time_spent_us = start.elapsed().as_micros() as u64;
                    return result;
                }
            }
        }

        result.time_spent_us = start.elapsed().as_micros() as u64;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn higher_priority_action_is_tried_first() {
        let mut registry = RecoveryRegistry::new();
        let order: Arc<std::sync::Mutex<Vec<&'static str>>> = Arc::new(std::sync::Mutex::new(Vec::new()));

        let order_low = order.clone();
        let mut low = RecoveryAction::new("low", Box::new(move || {
            order_low.lock().unwrap().push("low");
            false
        }));
        low.priority = 0;

        let order_high = order.clone();
        let mut high = RecoveryAction::new("high", Box::new(move || {
            order_high.lock().unwrap().push("high");
            true
        }));
        high.priority = 10;

        registry.register(ErrorCode::StreamUnderrun, low);
        registry.register(ErrorCode::StreamUnderrun, high);

        let result = registry.attempt(ErrorCode::StreamUnderrun, false);
        assert!(result.successful);
        assert_eq!(result.action_taken, "high");
        assert_eq!(*order.lock().unwrap(), vec!["high"]);
    }

    #[test]
    fn realtime_context_skips_non_realtime_safe_actions() {
        let mut registry = RecoveryRegistry::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_cb = calls.clone();
        let mut action = RecoveryAction::new("unsafe", Box::new(move || {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            true
        }));
        action.allow_in_realtime = false;
        registry.register(ErrorCode::CallbackTimeout, action);

        let result = registry.attempt(ErrorCode::CallbackTimeout, true);
        assert!(!result.successful);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn retries_up_to_max_before_giving_up() {
        let mut registry = RecoveryRegistry::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_cb = calls.clone();
        let mut action = RecoveryAction::new("flaky", Box::new(move || {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            false
        }));
        action.max_retries = 3;
        registry.register(ErrorCode::DeviceDisconnected, action);

        let result = registry.attempt(ErrorCode::DeviceDisconnected, false);
        assert!(!result.successful);
        assert_eq!(result.retries_used, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unregistered_code_yields_unsuccessful_result() {
        let mut registry = RecoveryRegistry::new();
        let result = registry.attempt(ErrorCode::Unknown, false);
        assert!(!result.successful);
        assert_eq!(result.retries_used, 0);
    }
}
