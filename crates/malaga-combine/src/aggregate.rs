//! Table-level composite aggregation.

use malaga_traits::{Result, Watchlist};
use tracing::debug;

use crate::combiner::{Combiner, SignalScore};

/// Appends the composite of `score_columns` to a copy of `watchlist`.
///
/// The output column is replaced if it already exists. The input watchlist
/// is left untouched.
///
/// # Errors
///
/// Returns `MissingColumn` for an absent score column and
/// `ConfigurationMismatch` when `score_columns` is empty.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_combine::{EqualWeightCombiner, aggregate};
///
/// # fn run(watchlist: &malaga_traits::Watchlist) -> malaga_traits::Result<()> {
/// let columns = ["PE Percentile", "PB Percentile"];
/// let scored = aggregate(&EqualWeightCombiner::default(), watchlist, &columns, "RV Score")?;
/// # Ok(())
/// # }
/// ```
pub fn aggregate<C, S>(
    combiner: &C,
    watchlist: &Watchlist,
    score_columns: &[S],
    output_column: &str,
) -> Result<Watchlist>
where
    C: Combiner + ?Sized,
    S: AsRef<str>,
{
    let signals = score_columns
        .iter()
        .map(|column| {
            let column = column.as_ref();
            Ok(SignalScore::new(column, watchlist.values(column)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let composite = combiner.combine(&signals)?;
    debug!(
        combiner = combiner.name(),
        inputs = signals.len(),
        output = output_column,
        "aggregated composite score"
    );
    watchlist.with_values(output_column, composite.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EqualWeightCombiner;
    use approx::assert_relative_eq;
    use malaga_traits::MalagaError;
    use polars::prelude::*;

    fn watchlist() -> Watchlist {
        let df = df! {
            "symbol" => ["AAA", "BBB", "CCC"],
            "p1" => [Some(1.0), Some(0.5), None],
            "p2" => [Some(0.5), Some(1.0), Some(1.0)],
        }
        .unwrap();
        Watchlist::new(df).unwrap()
    }

    #[test]
    fn test_aggregate_appends_composite() {
        let input = watchlist();
        let scored = aggregate(&EqualWeightCombiner::default(), &input, &["p1", "p2"], "score")
            .unwrap();

        let score = scored.values("score").unwrap();
        assert_relative_eq!(score[0], 0.75);
        assert_relative_eq!(score[1], 0.75);
        assert!(score[2].is_nan());
        assert!(!input.has_column("score"));
    }

    #[test]
    fn test_aggregate_replaces_existing_column() {
        let first = aggregate(&EqualWeightCombiner::default(), &watchlist(), &["p2"], "p1")
            .unwrap();
        assert_eq!(first.columns().len(), 3);
        assert_relative_eq!(first.values("p1").unwrap()[2], 1.0);
    }

    #[test]
    fn test_aggregate_errors() {
        let combiner = EqualWeightCombiner::default();
        assert!(matches!(
            aggregate(&combiner, &watchlist(), &["absent"], "score"),
            Err(MalagaError::MissingColumn(_))
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            aggregate(&combiner, &watchlist(), &none, "score"),
            Err(MalagaError::ConfigurationMismatch(_))
        ));
    }
}
