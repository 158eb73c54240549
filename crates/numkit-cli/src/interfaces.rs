//! Presenter interface and the report types it consumes.

use std::time::Duration;

use num_bigint::BigUint;
use serde::Serialize;

use numkit_core::options::Dispatch;
use numkit_core::stats::Summary;

/// Trait for presenting results to the user.
pub trait ResultPresenter {
    /// Present F(n).
    fn present_fibonacci(&self, n: u64, value: &BigUint, duration: Duration, details: bool);

    /// Present several Fibonacci numbers computed together.
    fn present_fibonacci_batch(&self, values: &[(u64, BigUint)], duration: Duration);

    /// Present an integral.
    fn present_integral(&self, report: &IntegralReport);

    /// Present a statistics summary.
    fn present_summary(&self, summary: &Summary);

    /// Present the result of a two-sum search.
    fn present_two_sum(&self, target: i64, pair: Option<(usize, usize)>);

    /// Present n!.
    fn present_factorial(&self, n: u64, value: &BigUint, duration: Duration);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Result of one integration run.
#[derive(Debug, Clone, Serialize)]
pub struct IntegralReport {
    /// Name of the integrated function.
    pub function: String,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Chunk count, `None` for a single scan.
    pub chunks: Option<usize>,
    /// Dispatch strategy used for chunks.
    pub dispatch: Option<Dispatch>,
    /// The approximated integral.
    pub value: f64,
    /// Wall-clock time in milliseconds.
    pub duration_ms: f64,
}

impl IntegralReport {
    /// Wall-clock time as a `Duration`.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_ms / 1000.0)
    }
}
