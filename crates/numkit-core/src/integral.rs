//! Fixed-step rectangle-rule integration, single-chunk and chunked.
//!
//! Both entry points walk the interval with a running position `x`,
//! accumulating `f(x) * dx` while `x <= upper`. The correction factor is
//! applied exactly once per integral: the chunked path sums uncorrected
//! partial results and corrects the total.

use std::convert::Infallible;

use serde::Serialize;
use tracing::{debug, trace};

use crate::constants::CANCEL_CHECK_INTERVAL;
use crate::error::NumError;
use crate::options::IntegrationOptions;
use crate::parallel::parallel_map_with;
use crate::progress::{CancellationToken, ChildToken};

/// One contiguous sub-interval of an integration domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chunk {
    /// Position of the chunk, `0..chunks`.
    pub index: usize,
    /// Lower bound (inclusive).
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Split `[lower, upper]` into `chunks` equal-width chunks.
///
/// Chunk `i` spans `[lower + i*inc, lower + i*inc + inc]` with
/// `inc = (upper - lower) / chunks`.
pub fn plan_chunks(lower: f64, upper: f64, chunks: usize) -> Result<Vec<Chunk>, NumError> {
    if chunks == 0 {
        return Err(NumError::InvalidInterval(
            "chunk count must be at least 1".into(),
        ));
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(NumError::InvalidInterval(format!(
            "bounds must be finite, got [{lower}, {upper}]"
        )));
    }
    if lower > upper {
        return Err(NumError::InvalidInterval(format!(
            "lower bound {lower} exceeds upper bound {upper}"
        )));
    }

    let width = upper - lower;
    if !width.is_finite() {
        return Err(NumError::InvalidInterval(format!(
            "interval [{lower}, {upper}] is too wide"
        )));
    }

    let inc = width / chunks as f64;
    Ok((0..chunks)
        .map(|index| {
            let start = lower + index as f64 * inc;
            Chunk {
                index,
                lower: start,
                upper: start + inc,
            }
        })
        .collect())
}

/// Uncorrected left-rectangle sum of `f` over `[lower, upper]`.
///
/// Returns 0 when `lower > upper`.
pub fn riemann_sum<F>(f: F, lower: f64, upper: f64, dx: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    scan(&f, lower, upper, dx, || Ok::<(), Infallible>(())).unwrap_or_else(|never| match never {})
}

fn scan<F, C, E>(f: &F, lower: f64, upper: f64, dx: f64, mut checkpoint: C) -> Result<f64, E>
where
    F: Fn(f64) -> f64,
    C: FnMut() -> Result<(), E>,
{
    let mut sum = 0.0;
    let mut x = lower;
    let mut steps: u64 = 0;
    while x <= upper {
        sum += f(x) * dx;
        let next = x + dx;
        if next <= x {
            // dx is below the resolution of x; the walk cannot advance.
            break;
        }
        x = next;
        steps += 1;
        if steps % CANCEL_CHECK_INTERVAL == 0 {
            checkpoint()?;
        }
    }
    Ok(sum)
}

fn chunk_sum<F>(f: &F, chunk: &Chunk, dx: f64, token: &ChildToken) -> Result<f64, NumError>
where
    F: Fn(f64) -> f64,
{
    token.check_cancelled()?;
    let sum = scan(f, chunk.lower, chunk.upper, dx, || token.check_cancelled())?;
    trace!(chunk = chunk.index, lower = chunk.lower, upper = chunk.upper, sum, "chunk done");
    Ok(sum)
}

/// Rectangle-rule integrator with configurable step, correction, and dispatch.
#[derive(Debug, Clone, Default)]
pub struct Integrator {
    opts: IntegrationOptions,
}

impl Integrator {
    /// Create an integrator from (normalized) options.
    #[must_use]
    pub fn new(opts: IntegrationOptions) -> Self {
        Self {
            opts: opts.normalize(),
        }
    }

    /// Single-chunk integral: corrected rectangle-rule sum over `[lower, upper]`.
    pub fn integrate<F>(&self, f: F, lower: f64, upper: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        riemann_sum(f, lower, upper, self.opts.dx) * self.opts.correction
    }

    /// Chunked integral: one uncorrected chunk sum per chunk, dispatched per
    /// the configured strategy, summed in chunk order, corrected once.
    pub fn integrate_chunked<F>(
        &self,
        f: F,
        lower: f64,
        upper: f64,
        chunks: usize,
        cancel: &CancellationToken,
    ) -> Result<f64, NumError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let plan = plan_chunks(lower, upper, chunks)?;
        let dx = self.opts.dx;
        debug!(
            lower,
            upper,
            chunks,
            dispatch = ?self.opts.dispatch,
            "integrating in chunks"
        );

        let partials = parallel_map_with(
            plan,
            move |chunk: Chunk, token: &ChildToken| chunk_sum(&f, &chunk, dx, token),
            &self.opts.map_options(),
            cancel,
        )?;

        let total: f64 = partials.iter().sum();
        Ok(total * self.opts.correction)
    }
}

/// Approximate the integral of `f` over `[lower, upper]` in a single scan.
///
/// # Example
/// ```
/// let area = numkit_core::integral(|x| x, 0.0, 1.0);
/// assert!((area - 0.5).abs() < 1e-3);
/// ```
pub fn integral<F>(f: F, lower: f64, upper: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    Integrator::default().integrate(f, lower, upper)
}

/// Approximate the integral of `f` over `[lower, upper]` using `chunks`
/// concurrently evaluated chunks.
pub fn integral_chunked<F>(f: F, lower: f64, upper: f64, chunks: usize) -> Result<f64, NumError>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    Integrator::default().integrate_chunked(f, lower, upper, chunks, &CancellationToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CORRECTION_FACTOR, DX};
    use crate::options::Dispatch;
    use std::time::Duration;

    #[test]
    fn identity_over_unit_interval() {
        let area = integral(|x| x, 0.0, 1.0);
        assert!((area - 0.5).abs() < 1e-3, "got {area}");
    }

    #[test]
    fn chunked_polynomial() {
        let area = integral_chunked(|x| x * x + 1.0, 0.0, 10.0, 2).unwrap();
        assert!((area - 343.33).abs() < 0.5, "got {area}");
    }

    #[test]
    fn single_chunk_is_deterministic() {
        let a = integral(f64::sin, 0.0, 3.0);
        let b = integral(f64::sin, 0.0, 3.0);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn reversed_bounds_give_zero() {
        assert!(integral(|x| x, 1.0, 0.0).abs() < f64::EPSILON);
        assert!(riemann_sum(|x| x, 1.0, 0.0, DX).abs() < f64::EPSILON);
    }

    #[test]
    fn correction_applied_exactly_once() {
        let f = |x: f64| x * x + 1.0;
        let plan = plan_chunks(0.0, 10.0, 4).unwrap();
        let raw: f64 = plan
            .iter()
            .map(|c| riemann_sum(f, c.lower, c.upper, DX))
            .sum();

        let chunked = integral_chunked(f, 0.0, 10.0, 4).unwrap();
        assert_eq!(chunked.to_bits(), (raw * CORRECTION_FACTOR).to_bits());
    }

    #[test]
    fn one_chunk_matches_single_scan() {
        let single = integral(|x| 3.0 * x, 0.0, 1.0);
        let chunked = integral_chunked(|x| 3.0 * x, 0.0, 1.0, 1).unwrap();
        assert_eq!(single.to_bits(), chunked.to_bits());
    }

    #[test]
    fn dispatch_strategies_agree() {
        let cancel = CancellationToken::new();
        let results: Vec<f64> = [Dispatch::Threads, Dispatch::Pool, Dispatch::Sequential]
            .into_iter()
            .map(|dispatch| {
                let integrator = Integrator::new(IntegrationOptions {
                    dispatch,
                    ..Default::default()
                });
                integrator
                    .integrate_chunked(f64::cos, 0.0, 2.0, 3, &cancel)
                    .unwrap()
            })
            .collect();
        assert_eq!(results[0].to_bits(), results[1].to_bits());
        assert_eq!(results[0].to_bits(), results[2].to_bits());
    }

    #[test]
    fn pool_dispatch_inside_single_thread_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let integrator = Integrator::new(IntegrationOptions {
            dispatch: Dispatch::Pool,
            chunk_timeout: Duration::from_secs(5),
            ..Default::default()
        });
        let area = pool
            .install(|| integrator.integrate_chunked(|x| x, 0.0, 1.0, 2, &CancellationToken::new()))
            .unwrap();
        assert!((area - 0.5).abs() < 1e-3, "got {area}");
    }

    #[test]
    fn plan_covers_interval() {
        let plan = plan_chunks(-2.0, 6.0, 4).unwrap();
        assert_eq!(plan.len(), 4);
        assert!((plan[0].lower + 2.0).abs() < f64::EPSILON);
        assert!((plan[3].upper - 6.0).abs() < 1e-12);
        for pair in plan.windows(2) {
            assert!((pair[0].upper - pair[1].lower).abs() < 1e-12);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
    }

    #[test]
    fn rejects_zero_chunks() {
        assert!(matches!(
            integral_chunked(|x| x, 0.0, 1.0, 0),
            Err(NumError::InvalidInterval(_))
        ));
    }

    #[test]
    fn rejects_reversed_and_non_finite_bounds() {
        assert!(matches!(
            integral_chunked(|x| x, 1.0, 0.0, 2),
            Err(NumError::InvalidInterval(_))
        ));
        assert!(matches!(
            integral_chunked(|x| x, 0.0, f64::INFINITY, 2),
            Err(NumError::InvalidInterval(_))
        ));
        assert!(matches!(
            integral_chunked(|x| x, f64::NAN, 1.0, 2),
            Err(NumError::InvalidInterval(_))
        ));
        assert!(matches!(
            plan_chunks(-f64::MAX, f64::MAX, 2),
            Err(NumError::InvalidInterval(_))
        ));
    }

    #[test]
    fn panicking_function_fails_the_call() {
        let result = integral_chunked(
            |x| {
                assert!(x < 6.0, "outside domain");
                x
            },
            0.0,
            10.0,
            4,
        );
        match result {
            Err(NumError::TaskFailure { index, .. }) => assert!(index >= 2),
            other => panic!("expected task failure, got {other:?}"),
        }
    }

    #[test]
    fn slow_chunk_times_out() {
        let integrator = Integrator::new(IntegrationOptions {
            chunk_timeout: Duration::from_millis(20),
            ..Default::default()
        });
        let result = integrator.integrate_chunked(
            |x| {
                if x.abs() < f64::EPSILON {
                    std::thread::sleep(Duration::from_millis(300));
                }
                x
            },
            0.0,
            1.0,
            1,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(NumError::Timeout { index: 0, .. })));
    }

    #[test]
    fn cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = Integrator::default().integrate_chunked(|x| x, 0.0, 1.0, 2, &cancel);
        assert_eq!(result, Err(NumError::Cancelled));
    }

    #[test]
    fn stalled_walk_terminates() {
        // 1e20 + 1e-5 == 1e20, so the running position cannot advance.
        let sum = riemann_sum(|_| 1.0, 1e20, 2e20, DX);
        assert!((sum - DX).abs() < f64::EPSILON);
    }
}
