//! Statistical utility functions for cross-sectional scoring.
//!
//! This module provides the percentile-of-score rank used by the percentile
//! scorer and the row means used by composite aggregation.

use serde::{Deserialize, Serialize};

/// How `NaN` entries of a cross-section take part in percentile ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NanPolicy {
    /// Rank every value against the non-`NaN` values only; `NaN` inputs
    /// produce `NaN` percentiles.
    #[default]
    Omit,
    /// Any `NaN` in the cross-section makes every percentile `NaN`.
    Propagate,
}

/// Percentile rank of `score` within an ascending-sorted, `NaN`-free pool.
///
/// Uses the mean-rank convention: values strictly below `score` count fully
/// and ties are averaged, scaled to `[0, 1]`:
///
/// `(left + right + (right > left)) / (2 n)` with `left = #{v < score}` and
/// `right = #{v <= score}`.
///
/// Returns `NaN` for a `NaN` score or an empty pool.
///
/// # Examples
///
/// ```
/// use malaga_traits::stats::percentile_of_score;
///
/// let pool = [10.0, 20.0, 30.0];
/// assert!((percentile_of_score(&pool, 20.0) - 2.0 / 3.0).abs() < 1e-12);
/// assert!((percentile_of_score(&pool, 30.0) - 1.0).abs() < 1e-12);
/// ```
pub fn percentile_of_score(sorted_pool: &[f64], score: f64) -> f64 {
    if score.is_nan() || sorted_pool.is_empty() {
        return f64::NAN;
    }

    let left = sorted_pool.partition_point(|v| *v < score);
    let right = sorted_pool.partition_point(|v| *v <= score);
    let bump = usize::from(right > left);

    (left + right + bump) as f64 / (2 * sorted_pool.len()) as f64
}

/// Percentile rank of every value of a cross-section, aligned with the input.
///
/// Sorts once and binary-searches each value, O(n log n).
///
/// # Examples
///
/// ```
/// use malaga_traits::stats::{percentile_ranks, NanPolicy};
///
/// let ranks = percentile_ranks(&[3.0, 1.0, 2.0], NanPolicy::Omit);
/// assert!((ranks[0] - 1.0).abs() < 1e-12);
/// assert!((ranks[1] - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn percentile_ranks(values: &[f64], policy: NanPolicy) -> Vec<f64> {
    let has_nan = values.iter().any(|v| v.is_nan());
    if has_nan && policy == NanPolicy::Propagate {
        return vec![f64::NAN; values.len()];
    }

    let mut pool: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();
    pool.sort_by(f64::total_cmp);

    values
        .iter()
        .map(|&value| percentile_of_score(&pool, value))
        .collect()
}

/// Arithmetic mean that propagates `NaN`. Empty input yields `NaN`.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Arithmetic mean over the non-`NaN` values; `NaN` when none remain.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Empirical quantile with linear interpolation between closest ranks.
///
/// `NaN` values are ignored; `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().filter(|v| !v.is_nan()).copied().collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_percentile_ranks_basic() {
        let ranks = percentile_ranks(&[10.0, 20.0, 30.0], NanPolicy::Omit);
        assert_relative_eq!(ranks[0], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(ranks[1], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(ranks[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_ties_use_mean_rank() {
        // Two tied values share (0 + 2 + 1) / 4.
        let ranks = percentile_ranks(&[5.0, 5.0, 9.0, 1.0], NanPolicy::Omit);
        assert_relative_eq!(ranks[0], 5.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(ranks[1], 5.0 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(ranks[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(ranks[3], 1.0 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_all_equal() {
        let ranks = percentile_ranks(&[0.0, 0.0, 0.0], NanPolicy::Omit);
        for rank in ranks {
            assert_relative_eq!(rank, 4.0 / 6.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_percentile_nan_omit() {
        let ranks = percentile_ranks(&[1.0, f64::NAN, 3.0], NanPolicy::Omit);
        assert_relative_eq!(ranks[0], 0.5, epsilon = 1e-12);
        assert!(ranks[1].is_nan());
        assert_relative_eq!(ranks[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_nan_propagate() {
        let ranks = percentile_ranks(&[1.0, f64::NAN, 3.0], NanPolicy::Propagate);
        assert!(ranks.iter().all(|r| r.is_nan()));

        let clean = percentile_ranks(&[1.0, 3.0], NanPolicy::Propagate);
        assert_relative_eq!(clean[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_empty() {
        assert!(percentile_ranks(&[], NanPolicy::Omit).is_empty());
        assert!(percentile_of_score(&[], 1.0).is_nan());
    }

    #[test]
    fn test_mean_propagates_nan() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_nan_mean_skips_nan() {
        assert_relative_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_quantile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile(&values, 0.5), 3.0);
        assert_relative_eq!(quantile(&values, 0.0), 1.0);
        assert_relative_eq!(quantile(&values, 1.0), 5.0);
        assert_relative_eq!(quantile(&values, 0.25), 2.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    proptest! {
        #[test]
        fn prop_percentiles_invariant_under_monotonic_transform(
            raw in prop::collection::vec(-1000i32..1000, 1..60)
        ) {
            let values: Vec<f64> = raw.iter().map(|&v| f64::from(v)).collect();
            let scaled: Vec<f64> = values.iter().map(|v| v * 10.0 + 5.0).collect();

            let a = percentile_ranks(&values, NanPolicy::Omit);
            let b = percentile_ranks(&scaled, NanPolicy::Omit);
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-12);
            }
        }

        #[test]
        fn prop_percentiles_within_unit_interval(
            raw in prop::collection::vec(-1.0e6f64..1.0e6, 1..60)
        ) {
            let ranks = percentile_ranks(&raw, NanPolicy::Omit);
            let floor = 1.0 / (2.0 * raw.len() as f64);
            for rank in ranks {
                prop_assert!(rank >= floor - 1e-12 && rank <= 1.0 + 1e-12);
            }
        }
    }
}
