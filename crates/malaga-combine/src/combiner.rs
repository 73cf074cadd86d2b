//! Core trait definition for score combiners.

use malaga_traits::Result;
use ndarray::Array1;

/// Score output from a single factor for combination.
///
/// Each factor produces one percentile per asset in the cross-section. The
/// combiner takes several of these and produces a composite score.
#[derive(Debug, Clone)]
pub struct SignalScore {
    /// Source column name
    pub name: String,

    /// Percentiles for each asset, `NaN` where the input was missing
    pub scores: Array1<f64>,
}

impl SignalScore {
    /// Create a score vector from a named column of values.
    pub fn new(name: impl Into<String>, scores: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            scores: Array1::from_vec(scores),
        }
    }
}

/// Combines multiple factor scores into a composite.
///
/// Implementors define different strategies for weighting and combining
/// scores. All implementations must be thread-safe (Send + Sync).
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_combine::{Combiner, SignalScore};
/// use ndarray::Array1;
///
/// struct FirstOnly;
///
/// impl Combiner for FirstOnly {
///     fn combine(&self, signals: &[SignalScore]) -> malaga_traits::Result<Array1<f64>> {
///         Ok(signals[0].scores.clone())
///     }
///
///     fn name(&self) -> &str {
///         "first_only"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine multiple score vectors into a composite vector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationMismatch` if no scores are provided or the
    /// vectors have mismatched lengths.
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_score_creation() {
        let score = SignalScore::new("1M return percentile", vec![0.5, 0.25, 1.0]);

        assert_eq!(score.name, "1M return percentile");
        assert_eq!(score.scores.len(), 3);
    }
}
