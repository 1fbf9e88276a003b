//! Lock-free real-time error reporting, mirroring `AudioErrorHandler.h`'s
//! fixed-capacity `rtErrorQueue_` fed by `reportRealTimeError` and
//! drained by `processRealTimeErrors`. No allocation, no locks: a fixed
//! byte buffer per entry and a [`crossbeam_queue::ArrayQueue`] carry the
//! report off the audio thread.

use std::time::SystemTime;

use crossbeam_queue::ArrayQueue;

use crate::code::ErrorCode;

/// Max bytes of message text an RT error entry can carry; longer
/// messages are truncated at the reporting call, never in the queue.
pub const RT_MESSAGE_CAPACITY: usize = 64;

/// Default queue depth, matching the teacher's `RT_ERROR_QUEUE_SIZE`.
pub const RT_QUEUE_SIZE: usize = 256;

/// A single RT-safe error entry: a code, a fixed-capacity message
/// buffer, and a length, with no heap allocation anywhere in its fields.
#[derive(Debug, Clone, Copy)]
pub struct RtError {
    /// The error code.
    pub code: ErrorCode,
    /// When the error was pushed.
    pub timestamp: SystemTime,
    message: [u8; RT_MESSAGE_CAPACITY],
    message_len: u8,
}

impl RtError {
    fn new(code: ErrorCode, message: &str) -> Self {
        let mut buf = [0u8; RT_MESSAGE_CAPACITY];
        let bytes = message.as_bytes();
        let len = bytes.len().min(RT_MESSAGE_CAPACITY);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self {
            code,
            timestamp: SystemTime::now(),
            message: buf,
            message_len: len as u8,
        }
    }

    /// The message text, truncated to [`RT_MESSAGE_CAPACITY`] bytes at
    /// the nearest valid UTF-8 boundary.
    pub fn message(&self) -> &str {
        let len = self.message_len as usize;
        let mut end = len;
        while end > 0 && std::str::from_utf8(&self.message[..end]).is_err() {
            end -= 1;
        }
        std::str::from_utf8(&self.message[..end]).unwrap_or("")
    }
}

/// Bounded, lock-free, allocation-free queue for reporting errors from
/// the audio callback. Pushing never blocks: a full queue silently
/// drops the report rather than stalling the callback.
pub struct RtErrorQueue {
    queue: ArrayQueue<RtError>,
}

impl RtErrorQueue {
    /// Create a queue with room for `capacity` pending entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
        }
    }

    /// Push an error report from the RT thread. Truncates `message` to
    /// [`RT_MESSAGE_CAPACITY`] bytes and drops the report if the queue
    /// is full, rather than blocking.
    pub fn push(&self, code: ErrorCode, message: &str) {
        let _ = self.queue.push(RtError::new(code, message));
    }

    /// Drain all currently queued entries, in FIFO order. Called from
    /// a non-RT thread.
    pub fn drain(&self) -> Vec<RtError> {
        let mut out = Vec::new();
        while let Some(entry) = self.queue.pop() {
            out.push(entry);
        }
        out
    }

    /// Number of entries currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for RtErrorQueue {
    fn default() -> Self {
        Self::new(RT_QUEUE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_round_trips_in_order() {
        let q = RtErrorQueue::new(4);
        q.push(ErrorCode::StreamUnderrun, "first");
        q.push(ErrorCode::StreamOverrun, "second");

        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message(), "first");
        assert_eq!(drained[1].message(), "second");
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops_new_entries_without_panicking() {
        let q = RtErrorQueue::new(1);
        q.push(ErrorCode::CallbackTimeout, "a");
        q.push(ErrorCode::CallbackTimeout, "b");
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn overlong_message_is_truncated_not_rejected() {
        let q = RtErrorQueue::new(1);
        let long = "x".repeat(RT_MESSAGE_CAPACITY + 50);
        q.push(ErrorCode::BufferOverflow, &long);
        let drained = q.drain();
        assert!(drained[0].message().len() <= RT_MESSAGE_CAPACITY);
    }
}
