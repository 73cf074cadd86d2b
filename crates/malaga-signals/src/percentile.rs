//! Cross-sectional percentile scoring.
//!
//! Each target column of a watchlist is ranked against itself and the ranks,
//! normalized to `[0, 1]`, are written into the matching output column. Ties
//! share the mean rank, so scoring is invariant under any strictly monotonic
//! transform of the input.

use malaga_traits::stats::percentile_ranks;
use malaga_traits::{MalagaError, NanPolicy, Result, Watchlist};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the percentile column derived from a momentum period label.
pub fn percentile_column(label: &str) -> String {
    format!("{label} percentile")
}

/// Configuration for the percentile scorer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PercentileConfig {
    /// Treatment of `NaN` inputs (default: omit them from the ranking pool).
    #[serde(default)]
    pub nan_policy: NanPolicy,
}

/// Cross-sectional percentile scorer.
///
/// # Example
///
/// ```ignore
/// use malaga_signals::PercentileScorer;
///
/// let scorer = PercentileScorer::default();
/// let scored = scorer.score(&watchlist, &["1M return"], &["1M return percentile"])?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentileScorer {
    config: PercentileConfig,
}

impl PercentileScorer {
    /// Create a new scorer with the given configuration.
    #[must_use]
    pub const fn new(config: PercentileConfig) -> Self {
        Self { config }
    }

    /// Get the NaN policy.
    #[must_use]
    pub const fn nan_policy(&self) -> NanPolicy {
        self.config.nan_policy
    }

    /// Percentile ranks of one cross-section, aligned with the input.
    pub fn rank(&self, values: &[f64]) -> Vec<f64> {
        percentile_ranks(values, self.config.nan_policy)
    }

    /// Adds one percentile column per target column.
    ///
    /// Target columns of any numeric type are cast to `Float64`. The input
    /// watchlist is left untouched; output columns that already exist are
    /// replaced in the returned copy.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::ConfigurationMismatch`] if `targets` and `outputs`
    ///   differ in length
    /// - [`MalagaError::MissingColumn`] if a target column does not exist
    pub fn score<S: AsRef<str>, T: AsRef<str>>(
        &self,
        watchlist: &Watchlist,
        targets: &[S],
        outputs: &[T],
    ) -> Result<Watchlist> {
        if targets.len() != outputs.len() {
            return Err(MalagaError::mismatch(
                "target_columns",
                targets.len(),
                "output_columns",
                outputs.len(),
            ));
        }

        let mut scored = watchlist.clone();
        for (target, output) in targets.iter().zip(outputs) {
            let (target, output) = (target.as_ref(), output.as_ref());
            let values = watchlist.values(target)?;
            debug!(target, output, rows = values.len(), "scoring percentiles");
            scored = scored.with_values(output, self.rank(&values))?;
        }
        Ok(scored)
    }
}
