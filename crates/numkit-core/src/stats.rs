//! Descriptive statistics and small closed-form helpers.
//!
//! Everything here is pure and single-threaded. Functions that have no
//! meaningful answer for empty input return `None`.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigUint;
use num_traits::One;
use serde::Serialize;

/// Sum of all values (0 for empty input).
#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

/// Median; the two middle values are averaged for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Occurrence count of every distinct value.
#[must_use]
pub fn histogram<T: Ord + Clone>(values: &[T]) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most frequent value; ties go to the smallest value.
#[must_use]
pub fn mode<T: Ord + Clone>(values: &[T]) -> Option<T> {
    let counts = histogram(values);
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|&(_, count)| count == best)
        .map(|(value, _)| value)
}

/// Harmonic mean; `None` for empty input or when any value is zero.
#[must_use]
pub fn harmonic_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|&v| v == 0.0) {
        return None;
    }
    let reciprocal_sum: f64 = values.iter().map(|v| v.recip()).sum();
    Some(values.len() as f64 / reciprocal_sum)
}

/// Absolute deviation of `actual` from `expected`, in percent of `expected`.
#[must_use]
pub fn percent_dev(actual: f64, expected: f64) -> Option<f64> {
    if expected == 0.0 {
        return None;
    }
    Some((actual - expected).abs() / expected.abs() * 100.0)
}

/// Difference between the largest and smallest value.
#[must_use]
pub fn range(values: &[f64]) -> Option<f64> {
    let (first, rest) = values.split_first()?;
    let (min, max) = rest
        .iter()
        .fold((*first, *first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(max - min)
}

/// n!
#[must_use]
pub fn factorial(n: u64) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * k)
}

/// Indices `(i, j)`, `i < j`, of the first pair whose values add up to
/// `target`, scanning left to right.
#[must_use]
pub fn two_sum(values: &[i64], target: i64) -> Option<(usize, usize)> {
    let mut seen: HashMap<i64, usize> = HashMap::with_capacity(values.len());
    for (j, &value) in values.iter().enumerate() {
        if let Some(&i) = target.checked_sub(value).and_then(|want| seen.get(&want)) {
            return Some((i, j));
        }
        seen.entry(value).or_insert(j);
    }
    None
}

/// All statistics of a sample, as printed by the CLI.
///
/// `mode` and `histogram` are only filled in when every value is an integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<i64>,
    pub histogram: Option<BTreeMap<i64, usize>>,
    pub harmonic_mean: Option<f64>,
    pub range: Option<f64>,
}

impl Summary {
    /// Compute the summary of `values`.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let integers = as_integers(values);
        Self {
            count: values.len(),
            sum: sum(values),
            mean: mean(values),
            median: median(values),
            mode: integers.as_deref().and_then(mode),
            histogram: integers.as_deref().map(histogram),
            harmonic_mean: harmonic_mean(values),
            range: range(values),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integers(values: &[f64]) -> Option<Vec<i64>> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    values
        .iter()
        .map(|&v| (v.fract() == 0.0 && v.abs() <= LIMIT).then_some(v as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_inputs() {
        assert!(close(sum(&[]), 0.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mode::<i64>(&[]), None);
        assert!(histogram::<i64>(&[]).is_empty());
        assert_eq!(harmonic_mean(&[]), None);
        assert_eq!(range(&[]), None);
    }

    #[test]
    fn mean_and_sum() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(close(sum(&v), 10.0));
        assert!(close(mean(&v).unwrap(), 2.5));
    }

    #[test]
    fn median_odd_and_even() {
        assert!(close(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0));
        assert!(close(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5));
    }

    #[test]
    fn mode_prefers_smallest_on_tie() {
        assert_eq!(mode(&[3, 1, 3, 2, 1]), Some(1));
        assert_eq!(mode(&[5, 4, 5]), Some(5));
    }

    #[test]
    fn histogram_counts() {
        let h = histogram(&["a", "b", "a"]);
        assert_eq!(h.get("a"), Some(&2));
        assert_eq!(h.get("b"), Some(&1));
    }

    #[test]
    fn harmonic_mean_values() {
        assert!(close(harmonic_mean(&[1.0, 4.0, 4.0]).unwrap(), 2.0));
        assert_eq!(harmonic_mean(&[1.0, 0.0]), None);
    }

    #[test]
    fn percent_deviation() {
        assert!(close(percent_dev(110.0, 100.0).unwrap(), 10.0));
        assert!(close(percent_dev(90.0, 100.0).unwrap(), 10.0));
        assert!(close(percent_dev(-3.0, -2.0).unwrap(), 50.0));
        assert_eq!(percent_dev(1.0, 0.0), None);
    }

    #[test]
    fn range_values() {
        assert!(close(range(&[4.0, -1.0, 7.5]).unwrap(), 8.5));
        assert!(close(range(&[2.0]).unwrap(), 0.0));
    }

    #[test]
    fn factorial_values() {
        assert_eq!(factorial(0), BigUint::one());
        assert_eq!(factorial(5), BigUint::from(120u32));
        assert_eq!(
            factorial(25).to_string(),
            "15511210043330985984000000"
        );
    }

    #[test]
    fn two_sum_finds_first_pair() {
        assert_eq!(two_sum(&[2, 7, 11, 15], 9), Some((0, 1)));
        assert_eq!(two_sum(&[3, 2, 4], 6), Some((1, 2)));
        assert_eq!(two_sum(&[3, 3], 6), Some((0, 1)));
        assert_eq!(two_sum(&[1, 2], 7), None);
        assert_eq!(two_sum(&[i64::MIN, 1], i64::MAX), None);
    }

    #[test]
    fn summary_of_integers() {
        let s = Summary::from_values(&[1.0, 2.0, 2.0, 5.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mode, Some(2));
        assert_eq!(s.histogram.as_ref().and_then(|h| h.get(&2)), Some(&2));
        assert!(close(s.range.unwrap(), 4.0));
    }

    #[test]
    fn summary_of_fractions_has_no_mode() {
        let s = Summary::from_values(&[0.5, 1.5]);
        assert_eq!(s.mode, None);
        assert_eq!(s.histogram, None);
        assert!(close(s.mean.unwrap(), 1.0));
    }
}
