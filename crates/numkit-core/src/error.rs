//! Error type shared by the parallel map, integrator, and CLI.

use std::time::Duration;

/// Error type for numkit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumError {
    /// A dispatched task did not complete within its allotted duration.
    #[error("task {index} timed out after {timeout:?}")]
    Timeout {
        /// Input position of the task that timed out.
        index: usize,
        /// The per-task timeout that was exceeded.
        timeout: Duration,
    },

    /// The user-supplied function failed (or panicked) for one item.
    #[error("task {index} failed: {message}")]
    TaskFailure {
        /// Input position of the failing task.
        index: usize,
        /// Error or panic message reported by the task.
        message: String,
    },

    /// Chunk count or bounds cannot describe an integration domain.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// The computation was cancelled before it finished.
    #[error("computation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NumError {
    /// Index of the task the error refers to, if any.
    #[must_use]
    pub fn task_index(&self) -> Option<usize> {
        match self {
            Self::Timeout { index, .. } | Self::TaskFailure { index, .. } => Some(*index),
            _ => None,
        }
    }
}
