//! Error code taxonomy, mirroring `AudioErrorHandler.h`'s `AudioErrorCode`:
//! numeric ranges group errors by subsystem so a bare `u32` carried
//! through the RT-safe queue still sorts into a category.

/// Severity of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational: buffer resizes, device changes.
    Info,
    /// Non-critical: underruns, minor glitches.
    Warning,
    /// Recoverable: device disconnects, driver issues.
    Error,
    /// System-threatening: total audio failure, state corruption.
    Critical,
}

/// Subsystem an [`ErrorCode`] belongs to, derived from its numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 1xxx - hardware/device errors.
    Device,
    /// 2xxx - stream lifecycle errors.
    Stream,
    /// 3xxx - audio callback errors.
    Callback,
    /// 4xxx - DSP/processing errors.
    Processing,
    /// 5xxx - system resource errors.
    Resource,
    /// 6xxx - concurrency/thread-safety errors.
    Concurrency,
    /// 7xxx - missed performance goals.
    Performance,
    /// 8xxx - audio safety violations.
    Safety,
    /// 9xxx - unclassified.
    Unknown,
}

/// A specific error condition, numbered by category per the taxonomy
/// `Device 1xxx / Stream 2xxx / Callback 3xxx / Processing 4xxx /
/// Resource 5xxx / Concurrency 6xxx / Performance 7xxx / Safety 8xxx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Requested audio device does not exist.
    DeviceNotFound = 1000,
    /// Device was disconnected while streaming.
    DeviceDisconnected = 1001,
    /// Device configuration (format, channel count) could not be applied.
    DeviceConfigurationFailed = 1002,
    /// Requested sample rate is not supported by the device.
    UnsupportedSampleRate = 1004,
    /// Requested buffer size is not supported by the device.
    UnsupportedBufferSize = 1005,

    /// Stream failed to open.
    StreamOpenFailed = 2000,
    /// Stream failed to start.
    StreamStartFailed = 2001,
    /// An audio buffer underrun occurred.
    StreamUnderrun = 2003,
    /// An audio buffer overrun occurred.
    StreamOverrun = 2004,
    /// Measured stream latency exceeds the configured budget.
    StreamLatencyTooHigh = 2006,

    /// The audio callback took longer than its deadline.
    CallbackTimeout = 3000,
    /// The audio callback panicked or raised an error.
    CallbackException = 3001,
    /// The audio callback's CPU usage exceeded budget.
    CallbackCpuOverload = 3003,

    /// Sample rate conversion failed.
    SampleRateConversionFailed = 4000,
    /// Channel up/down-mixing failed.
    ChannelMixingFailed = 4001,
    /// An internal buffer overflowed.
    BufferOverflow = 4002,
    /// An internal buffer underflowed.
    BufferUnderflow = 4003,
    /// Output samples exceeded `[-1, 1]` without a limiter engaged.
    AudioClipping = 4004,

    /// Allocation failed.
    OutOfMemory = 5000,
    /// Overall CPU load exceeded the configured threshold.
    CpuOverload = 5001,
    /// Measured end-to-end system latency exceeded budget.
    SystemLatencyTooHigh = 5003,

    /// Concurrent access to shared state was detected where it should
    /// not occur (e.g. the RT thread observed a torn read).
    ConcurrentAccess = 6000,
    /// A lock could not be acquired within its timeout.
    LockTimeout = 6003,

    /// A performance goal (throughput, deadline) was missed.
    PerformanceGoalMissed = 7000,
    /// Measured latency exceeded the configured budget.
    LatencyBudgetExceeded = 7001,
    /// Measured jitter exceeded the configured budget.
    JitterTooHigh = 7003,

    /// A generic audio safety limit was violated.
    AudioSafetyViolation = 8000,
    /// The safety limiter clamped output volume.
    VolumeClampingActivated = 8001,
    /// Emergency mute was engaged.
    EmergencyMute = 8002,

    /// Unclassified error.
    Unknown = 9999,
}

impl ErrorCode {
    /// The numeric code, as carried through the RT-safe queue.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// The subsystem this code belongs to, derived from its range.
    pub fn category(self) -> ErrorCategory {
        match self.as_u32() / 1000 {
            1 => ErrorCategory::Device,
            2 => ErrorCategory::Stream,
            3 => ErrorCategory::Callback,
            4 => ErrorCategory::Processing,
            5 => ErrorCategory::Resource,
            6 => ErrorCategory::Concurrency,
            7 => ErrorCategory::Performance,
            8 => ErrorCategory::Safety,
            _ => ErrorCategory::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_category_follows_numeric_range() {
        assert_eq!(ErrorCode::DeviceNotFound.category(), ErrorCategory::Device);
        assert_eq!(ErrorCode::StreamUnderrun.category(), ErrorCategory::Stream);
        assert_eq!(ErrorCode::CallbackTimeout.category(), ErrorCategory::Callback);
        assert_eq!(ErrorCode::BufferOverflow.category(), ErrorCategory::Processing);
        assert_eq!(ErrorCode::OutOfMemory.category(), ErrorCategory::Resource);
        assert_eq!(ErrorCode::ConcurrentAccess.category(), ErrorCategory::Concurrency);
        assert_eq!(ErrorCode::JitterTooHigh.category(), ErrorCategory::Performance);
        assert_eq!(ErrorCode::EmergencyMute.category(), ErrorCategory::Safety);
        assert_eq!(ErrorCode::Unknown.category(), ErrorCategory::Unknown);
    }
}
