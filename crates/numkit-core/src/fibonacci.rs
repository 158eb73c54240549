//! Memoized top-down Fibonacci over a [`SharedCache`].
//!
//! The descent visits `n`, then `n - 1` before `n - 2`, consulting the cache
//! before every descent and writing each value back as soon as both of its
//! operands are known. An explicit stack replaces call recursion so deep
//! indices cannot overflow the thread stack.

use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::{debug, trace};

use crate::cache::SharedCache;
use crate::error::NumError;
use crate::parallel::parallel_map;

/// Cache type used by the Fibonacci evaluator.
pub type FibCache = SharedCache<u64, BigUint>;

/// Create a cache seeded with the base cases `F(0) = 0` and `F(1) = 1`.
#[must_use]
pub fn seeded_cache() -> FibCache {
    SharedCache::with_entries([(0, BigUint::zero()), (1, BigUint::one())])
}

/// Compute F(n) with a fresh memoization cache.
///
/// # Example
/// ```
/// assert_eq!(numkit_core::fibonacci(10).to_string(), "55");
/// assert_eq!(numkit_core::fibonacci(0).to_string(), "0");
/// ```
#[must_use]
pub fn fibonacci(n: u64) -> BigUint {
    let cache = seeded_cache();
    let value = fibonacci_with_cache(n, &cache);
    debug!(n, stats = ?cache.stats(), "fibonacci done");
    value
}

/// Compute F(n) using (and filling) the given cache.
///
/// Base cases missing from the cache are filled in on demand, so an empty
/// cache works as well as one from [`seeded_cache`].
pub fn fibonacci_with_cache(n: u64, cache: &FibCache) -> BigUint {
    if let Some(value) = cache.get(&n) {
        return value;
    }

    let mut pending = vec![n];
    while let Some(&k) = pending.last() {
        if cache.contains(&k) {
            pending.pop();
            continue;
        }
        if k < 2 {
            cache.insert(k, BigUint::from(k));
            pending.pop();
            continue;
        }

        match (cache.get(&(k - 1)), cache.get(&(k - 2))) {
            (Some(a), Some(b)) => {
                trace!(k, "memoizing");
                cache.insert(k, a + b);
                pending.pop();
            }
            (a, b) => {
                // Push k-2 first so k-1 is evaluated first.
                if b.is_none() {
                    pending.push(k - 2);
                }
                if a.is_none() {
                    pending.push(k - 1);
                }
            }
        }
    }

    cache.get(&n).unwrap_or_default()
}

/// Compute several Fibonacci numbers concurrently over one shared cache.
///
/// Results are returned in the order of `ns`.
pub fn fibonacci_many(ns: &[u64], timeout: Duration) -> Result<Vec<BigUint>, NumError> {
    let cache = Arc::new(seeded_cache());
    let shared = Arc::clone(&cache);
    let values = parallel_map(
        ns.to_vec(),
        move |n| fibonacci_with_cache(n, &shared),
        timeout,
    )?;
    debug!(count = ns.len(), stats = ?cache.stats(), "fibonacci batch done");
    Ok(values)
}
