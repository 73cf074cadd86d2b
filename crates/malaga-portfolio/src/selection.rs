//! Ranking by composite score and top-N selection.

use malaga_traits::{Result, Watchlist};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Sort direction of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Highest score first.
    #[default]
    Descending,
    /// Lowest score first.
    Ascending,
}

/// Configuration for ranking and selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of rows kept after sorting (default: 50)
    pub top_n: usize,

    /// Sort direction (default: descending)
    pub order: SortOrder,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_n: 50,
            order: SortOrder::Descending,
        }
    }
}

/// Row order that sorts `scores` in `order`.
///
/// The sort is stable, so ties keep their original order, and `NaN` scores
/// always come last regardless of direction.
pub fn rank_order(scores: &[f64], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        let (x, y) = (scores[a], scores[b]);
        match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match order {
                SortOrder::Ascending => x.total_cmp(&y),
                SortOrder::Descending => y.total_cmp(&x),
            },
        }
    });
    indices
}

/// Sorts `watchlist` by `score_column` and keeps the first `top_n` rows.
///
/// Null scores are treated as `NaN` and sort last.
///
/// # Errors
///
/// Returns `MissingColumn` if `score_column` is absent.
pub fn rank_and_select(
    watchlist: &Watchlist,
    score_column: &str,
    config: &SelectionConfig,
) -> Result<Watchlist> {
    let scores = watchlist.values(score_column)?;
    let mut order = rank_order(&scores, config.order);
    order.truncate(config.top_n);

    debug!(
        score_column,
        order = ?config.order,
        kept = order.len(),
        of = scores.len(),
        "ranked watchlist"
    );
    watchlist.take_rows(&order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn watchlist() -> Watchlist {
        let df = df! {
            "symbol" => ["AAA", "BBB", "CCC", "DDD", "EEE"],
            "score" => [Some(0.5), None, Some(0.9), Some(0.5), Some(0.1)],
        }
        .unwrap();
        Watchlist::new(df).unwrap()
    }

    #[test]
    fn test_rank_order_descending_with_nan_last() {
        let order = rank_order(&[0.2, f64::NAN, 0.8, 0.5], SortOrder::Descending);
        assert_eq!(order, vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_rank_order_ascending_with_nan_last() {
        let order = rank_order(&[0.2, f64::NAN, 0.8, 0.5], SortOrder::Ascending);
        assert_eq!(order, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let order = rank_order(&[1.0, 2.0, 1.0, 2.0], SortOrder::Descending);
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_rank_and_select() {
        let selected = rank_and_select(
            &watchlist(),
            "score",
            &SelectionConfig {
                top_n: 3,
                order: SortOrder::Descending,
            },
        )
        .unwrap();
        assert_eq!(selected.symbols().unwrap(), vec!["CCC", "AAA", "DDD"]);
    }

    #[test]
    fn test_rank_and_select_keeps_nulls_last() {
        let selected = rank_and_select(
            &watchlist(),
            "score",
            &SelectionConfig {
                top_n: 10,
                order: SortOrder::Ascending,
            },
        )
        .unwrap();
        assert_eq!(
            selected.symbols().unwrap(),
            vec!["EEE", "AAA", "DDD", "CCC", "BBB"]
        );
    }

    #[test]
    fn test_missing_score_column() {
        let result = rank_and_select(&watchlist(), "HQM Score", &SelectionConfig::default());
        assert!(result.is_err());
    }
}
