//! Constants for integration, dispatch, and process exit codes.

use std::time::Duration;

/// Fixed step width of the rectangle rule.
pub const DX: f64 = 0.000_01;

/// Empirical correction for the truncation bias of the fixed-step scan.
/// Applied exactly once per integral, after all partial sums are added.
pub const CORRECTION_FACTOR: f64 = 1.000_000_1;

/// Per-chunk timeout used by the chunked integrator.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_millis(100_000);

/// Per-task timeout used when a caller does not supply one.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of scan steps between two cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Prefix for the names of threads spawned by the `Threads` dispatch.
pub const TASK_THREAD_PREFIX: &str = "numkit-task";

/// Exit codes for the `numkit` binary.
pub mod exit_codes {
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A parallel task timed out.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// A parallel task failed.
    pub const ERROR_TASK_FAILURE: i32 = 3;
    /// Invalid input or configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Computation cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
